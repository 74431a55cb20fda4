// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signing keys and the token issuer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use feedback_config::TokenConfig;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};

use super::{AuthClaims, Role};
use crate::error::{ApiError, ApiResult};

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// SigningKeys
// =============================================================================

/// HMAC key pair derived from the shared secret.
///
/// Built once at wiring time and shared by the issuer and the gate.
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    /// Derives keys from the shared secret.
    pub fn from_secret(secret: &str) -> ApiResult<Self> {
        if secret.is_empty() {
            return Err(ApiError::internal("signing secret is not configured"));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TokenIssuer
// =============================================================================

/// Mints signed bearer credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeys>,
    default_ttl_minutes: u64,
    max_ttl_minutes: u64,
}

impl TokenIssuer {
    /// Creates an issuer with explicit TTL bounds.
    pub fn new(keys: Arc<SigningKeys>, default_ttl_minutes: u64, max_ttl_minutes: u64) -> Self {
        Self {
            keys,
            default_ttl_minutes,
            max_ttl_minutes,
        }
    }

    /// Creates an issuer from the token section of the configuration.
    pub fn from_config(keys: Arc<SigningKeys>, config: &TokenConfig) -> Self {
        Self::new(keys, config.default_ttl_minutes, config.max_ttl_minutes)
    }

    /// Default lifetime in minutes.
    pub fn default_ttl_minutes(&self) -> u64 {
        self.default_ttl_minutes
    }

    /// Largest accepted lifetime in minutes.
    pub fn max_ttl_minutes(&self) -> u64 {
        self.max_ttl_minutes
    }

    /// Issues a credential for `role` valid for `ttl_minutes` from now.
    pub fn issue(&self, role: Role, ttl_minutes: u64) -> ApiResult<String> {
        self.issue_at(role, ttl_minutes, Utc::now())
    }

    /// Issues a credential as of `now`.
    pub fn issue_at(&self, role: Role, ttl_minutes: u64, now: DateTime<Utc>) -> ApiResult<String> {
        if ttl_minutes == 0 {
            return Err(ApiError::invalid_parameter(
                "minutes must be a positive integer",
            ));
        }
        if ttl_minutes > self.max_ttl_minutes {
            return Err(ApiError::invalid_parameter(format!(
                "minutes must not exceed {}",
                self.max_ttl_minutes
            )));
        }

        let ttl = i64::try_from(ttl_minutes)
            .map(Duration::minutes)
            .map_err(|_| ApiError::invalid_parameter("minutes is out of range"))?;
        let claims = AuthClaims::new(role, ttl, now);

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| ApiError::internal(format!("failed to sign token: {}", e)))?;

        tracing::debug!(role = %role, ttl_minutes, "Issued token");
        Ok(token)
    }

    /// Issues a credential from raw `minutes` and `role` query values.
    ///
    /// Absent or empty values fall back to the default lifetime and the
    /// unrestricted role.
    pub fn issue_from_params(&self, minutes: Option<&str>, role: Option<&str>) -> ApiResult<String> {
        let ttl_minutes = match minutes.map(str::trim).filter(|s| !s.is_empty()) {
            None => self.default_ttl_minutes,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => n as u64,
                Ok(_) => {
                    return Err(ApiError::invalid_parameter(
                        "minutes must be a positive integer",
                    ))
                }
                Err(_) => {
                    return Err(ApiError::invalid_parameter(format!(
                        "minutes must be an integer, got '{}'",
                        raw
                    )))
                }
            },
        };

        let role = match role.filter(|s| !s.is_empty()) {
            None => Role::default(),
            Some(raw) => raw.parse::<Role>().map_err(ApiError::invalid_parameter)?,
        };

        self.issue(role, ttl_minutes)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("default_ttl_minutes", &self.default_ttl_minutes)
            .field("max_ttl_minutes", &self.max_ttl_minutes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Validation};

    fn issuer() -> TokenIssuer {
        let keys = Arc::new(SigningKeys::from_secret("test-secret-key-for-testing-0123456789").unwrap());
        TokenIssuer::new(keys, 10, 1440)
    }

    fn claims_of(issuer: &TokenIssuer, token: &str) -> AuthClaims {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<AuthClaims>(token, issuer.keys.decoding(), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(SigningKeys::from_secret("").is_err());
    }

    #[test]
    fn test_issue_defaults() {
        let issuer = issuer();
        let before = Utc::now().timestamp();
        let token = issuer.issue_from_params(None, None).unwrap();
        let claims = claims_of(&issuer, &token);

        assert_eq!(claims.role(), Some(Role::Unrestricted));
        let exp = claims.exp.unwrap();
        assert!(exp >= before + 600 && exp <= before + 601);
    }

    #[test]
    fn test_issue_with_params() {
        let issuer = issuer();
        let token = issuer
            .issue_from_params(Some("5"), Some("read-only"))
            .unwrap();
        assert_eq!(claims_of(&issuer, &token).role(), Some(Role::ReadOnly));
    }

    #[test]
    fn test_issue_rejects_bad_minutes() {
        let issuer = issuer();
        for raw in ["0", "-3", "ten", "1441"] {
            let err = issuer.issue_from_params(Some(raw), None).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidParameter { .. }),
                "minutes={raw}"
            );
        }
    }

    #[test]
    fn test_issue_rejects_unknown_role() {
        let err = issuer()
            .issue_from_params(None, Some("admin"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { .. }));
        assert!(err.to_string().contains("admin"));
    }
}
