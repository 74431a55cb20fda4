// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer credentials: issuance and verification.
//!
//! - [`TokenIssuer`]: mints HS256 tokens carrying a role and an expiry
//! - [`AuthorizationGate`]: verifies tokens and checks role against operation
//!
//! Both are built from the same [`SigningKeys`], derived once from the
//! configured secret.

mod claims;
mod gate;
mod role;
mod token;

pub use claims::AuthClaims;
pub use gate::{AuthorizationGate, GateError};
pub use role::{Operation, Role};
pub use token::{SigningKeys, TokenIssuer, SIGNING_ALGORITHM};
