// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-route middleware.
//!
//! - [`GateMiddleware`]: bearer credential and role check
//! - [`CacheMiddleware`]: GET response cache
//!
//! Routes that use both apply the cache first and the gate last, so the gate
//! runs outermost and a rejected request never touches the cache.

mod cache;
mod gate;

pub use cache::{CacheLayer, CacheMiddleware, CACHE_HIT, CACHE_MISS, X_CACHE};
pub use gate::{GateLayer, GateMiddleware};
