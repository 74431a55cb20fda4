// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The authorization gate.
//!
//! Each request walks the same state machine:
//!
//! ```text
//! ExtractHeader -> ParseFormat -> VerifySignature -> CheckExpiry -> CheckRole
//!      400            400              401              401           401
//! ```
//!
//! The first failing step decides the error; later steps never run.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Validation};
use thiserror::Error;

use super::{AuthClaims, Operation, Role, SigningKeys, SIGNING_ALGORITHM};
use crate::error::ApiError;

// =============================================================================
// GateError
// =============================================================================

/// Why the gate rejected a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// No `Authorization` header.
    #[error("missing authorization header")]
    MissingHeader,

    /// Header is not `Bearer <token>`.
    #[error("malformed authorization header, expected 'Bearer <token>'")]
    MalformedHeader,

    /// Signature or algorithm mismatch, or an undecodable token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No `exp` claim.
    #[error("token has no expiry")]
    MissingExpiry,

    /// `exp` is not in the future.
    #[error("token expired")]
    Expired,

    /// No `role` claim.
    #[error("token has no role")]
    MissingRole,

    /// Role does not permit the operation, or is unknown.
    #[error("role '{role}' is not allowed to {operation}")]
    Forbidden {
        /// Role claim as presented.
        role: String,
        /// Attempted operation.
        operation: Operation,
    },
}

impl GateError {
    /// Returns the HTTP status for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::MissingHeader | GateError::MalformedHeader => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns the gate step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            GateError::MissingHeader => "extract_header",
            GateError::MalformedHeader => "parse_format",
            GateError::InvalidToken(_) => "verify_signature",
            GateError::MissingExpiry | GateError::Expired => "check_expiry",
            GateError::MissingRole | GateError::Forbidden { .. } => "check_role",
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::MissingHeader | GateError::MalformedHeader => {
                ApiError::invalid_parameter(err.to_string())
            }
            GateError::Forbidden { .. } => ApiError::forbidden(err.to_string()),
            _ => ApiError::unauthorized(err.to_string()),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

// =============================================================================
// AuthorizationGate
// =============================================================================

/// Verifies bearer credentials against expiry and role rules.
#[derive(Clone)]
pub struct AuthorizationGate {
    keys: Arc<SigningKeys>,
    validation: Arc<Validation>,
}

impl AuthorizationGate {
    /// Creates a gate over the shared signing keys.
    pub fn new(keys: Arc<SigningKeys>) -> Self {
        // Expiry and role are checked by hand so each failure maps to its own step.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            keys,
            validation: Arc::new(validation),
        }
    }

    /// Authorizes `operation` for the given `Authorization` header value.
    pub fn authorize(
        &self,
        header: Option<&HeaderValue>,
        operation: Operation,
    ) -> Result<AuthClaims, GateError> {
        self.authorize_at(header, operation, Utc::now())
    }

    /// Authorizes as of `now`.
    pub fn authorize_at(
        &self,
        header: Option<&HeaderValue>,
        operation: Operation,
        now: DateTime<Utc>,
    ) -> Result<AuthClaims, GateError> {
        let header = header.ok_or(GateError::MissingHeader)?;
        let token = parse_bearer(header)?;
        let claims = self.verify(token)?;

        if claims.exp.is_none() {
            return Err(GateError::MissingExpiry);
        }
        if claims.is_expired_at(now) {
            return Err(GateError::Expired);
        }

        let role_name = claims.role.as_deref().ok_or(GateError::MissingRole)?;
        match Role::parse(role_name) {
            Some(role) if role.permits(operation) => Ok(claims),
            _ => Err(GateError::Forbidden {
                role: role_name.to_string(),
                operation,
            }),
        }
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, GateError> {
        decode::<AuthClaims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => GateError::InvalidToken("bad signature".into()),
                ErrorKind::InvalidAlgorithm => {
                    GateError::InvalidToken("unexpected signing method".into())
                }
                _ => GateError::InvalidToken(e.to_string()),
            })
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish()
    }
}

/// Splits `Bearer <token>` into its token.
///
/// Exactly two space-separated parts, the first literally `Bearer`.
fn parse_bearer(header: &HeaderValue) -> Result<&str, GateError> {
    let value = header.to_str().map_err(|_| GateError::MalformedHeader)?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(GateError::MalformedHeader),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "gate-test-secret-0123456789abcdefghij";

    fn fixtures() -> (TokenIssuer, AuthorizationGate) {
        let keys = Arc::new(SigningKeys::from_secret(SECRET).unwrap());
        (
            TokenIssuer::new(keys.clone(), 10, 1440),
            AuthorizationGate::new(keys),
        )
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    fn sign(claims: &serde_json::Value, secret: &str, header: Header) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_missing_and_malformed_header() {
        let (_, gate) = fixtures();

        let err = gate.authorize(None, Operation::Read).unwrap_err();
        assert_eq!(err, GateError::MissingHeader);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        for raw in ["Basic abc", "Bearer", "Bearer a b", "bearer abc", "Bearer "] {
            let header = HeaderValue::from_static(raw);
            let err = gate.authorize(Some(&header), Operation::Read).unwrap_err();
            assert_eq!(err, GateError::MalformedHeader, "header {raw:?}");
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_role_matrix() {
        let (issuer, gate) = fixtures();
        let cases = [
            (Role::ReadOnly, Operation::Read, true),
            (Role::ReadOnly, Operation::Write, false),
            (Role::WriteOnly, Operation::Read, false),
            (Role::WriteOnly, Operation::Write, true),
            (Role::Unrestricted, Operation::Read, true),
            (Role::Unrestricted, Operation::Write, true),
        ];

        for (role, operation, allowed) in cases {
            let token = issuer.issue(role, 5).unwrap();
            let result = gate.authorize(Some(&bearer(&token)), operation);
            assert_eq!(result.is_ok(), allowed, "{role} {operation}");
            if let Err(err) = result {
                assert!(matches!(err, GateError::Forbidden { .. }));
                assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            }
        }
    }

    #[test]
    fn test_expired_token_rejected_for_every_role() {
        let (issuer, gate) = fixtures();
        let issued_at = Utc::now() - Duration::minutes(20);

        for role in Role::ALL {
            let token = issuer.issue_at(role, 10, issued_at).unwrap();
            let err = gate
                .authorize(Some(&bearer(&token)), Operation::Read)
                .unwrap_err();
            assert_eq!(err, GateError::Expired);
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let (issuer, gate) = fixtures();
        let now = Utc::now();
        let token = issuer.issue_at(Role::Unrestricted, 1, now).unwrap();
        let header = bearer(&token);

        assert!(gate
            .authorize_at(Some(&header), Operation::Read, now + Duration::seconds(59))
            .is_ok());
        assert_eq!(
            gate.authorize_at(Some(&header), Operation::Read, now + Duration::seconds(60))
                .unwrap_err(),
            GateError::Expired
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (_, gate) = fixtures();
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let token = sign(
            &serde_json::json!({ "exp": exp, "role": "unrestricted" }),
            "some-other-secret-0123456789abcdef",
            Header::default(),
        );

        let err = gate
            .authorize(Some(&bearer(&token)), Operation::Read)
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidToken(_)));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let (_, gate) = fixtures();
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let token = sign(
            &serde_json::json!({ "exp": exp, "role": "unrestricted" }),
            SECRET,
            Header::new(jsonwebtoken::Algorithm::HS512),
        );

        let err = gate
            .authorize(Some(&bearer(&token)), Operation::Read)
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidToken(_)));
    }

    #[test]
    fn test_missing_claims() {
        let (_, gate) = fixtures();
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();

        let no_exp = sign(&serde_json::json!({ "role": "unrestricted" }), SECRET, Header::default());
        assert_eq!(
            gate.authorize(Some(&bearer(&no_exp)), Operation::Read).unwrap_err(),
            GateError::MissingExpiry
        );

        let no_role = sign(&serde_json::json!({ "exp": exp }), SECRET, Header::default());
        assert_eq!(
            gate.authorize(Some(&bearer(&no_role)), Operation::Read).unwrap_err(),
            GateError::MissingRole
        );

        let unknown = sign(&serde_json::json!({ "exp": exp, "role": "admin" }), SECRET, Header::default());
        assert!(matches!(
            gate.authorize(Some(&bearer(&unknown)), Operation::Read).unwrap_err(),
            GateError::Forbidden { .. }
        ));
    }

    #[test]
    fn test_gate_error_into_api_error() {
        let err: ApiError = GateError::MalformedHeader.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = GateError::Expired.into();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(err.to_string(), "token expired");
    }
}
