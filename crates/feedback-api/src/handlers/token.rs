// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance handler.

use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::auth::TokenIssuer;
use crate::error::ApiResult;

/// Query parameters for `GET /token`.
///
/// Kept as raw strings so bad values surface as `{"error": ...}` bodies.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    /// Lifetime in minutes.
    pub minutes: Option<String>,
    /// Role name.
    pub role: Option<String>,
}

/// GET /token?minutes=<int>&role=<role>
///
/// Returns `Bearer <token>` as plain text.
pub async fn issue_token(
    State(issuer): State<Arc<TokenIssuer>>,
    params: Result<Query<TokenParams>, QueryRejection>,
) -> ApiResult<String> {
    let Query(params) = params?;
    let token = issuer.issue_from_params(params.minutes.as_deref(), params.role.as_deref())?;
    Ok(format!("Bearer {}", token))
}
