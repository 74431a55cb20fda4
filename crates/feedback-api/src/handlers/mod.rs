// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`status`]: liveness probe
//! - [`token`]: credential issuance
//! - [`feedback`]: create, fetch, list and page feedback records

mod feedback;
mod status;
mod token;

pub use feedback::*;
pub use status::*;
pub use token::*;
