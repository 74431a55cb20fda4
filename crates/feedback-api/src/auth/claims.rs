// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Claims carried by a bearer credential.
///
/// Both fields are optional on the wire so the gate can tell a missing claim
/// apart from a bad one. Claims are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Expiration time (Unix timestamp, seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AuthClaims {
    /// Creates claims for `role` expiring `ttl` after `now`.
    pub fn new(role: Role, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            exp: Some((now + ttl).timestamp()),
            role: Some(role.as_str().to_string()),
        }
    }

    /// Returns the expiry instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Returns `true` if the claims are expired at `now`. Missing expiry counts
    /// as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp <= now.timestamp(),
            None => true,
        }
    }

    /// Returns the parsed role, if present and known.
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_expiry() {
        let now = Utc::now();
        let claims = AuthClaims::new(Role::ReadOnly, Duration::minutes(10), now);

        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::minutes(10)));
        assert_eq!(claims.role(), Some(Role::ReadOnly));
        assert_eq!(claims.expires_at().map(|t| t.timestamp()), claims.exp);
    }

    #[test]
    fn test_claims_wire_format() {
        let claims = AuthClaims {
            exp: None,
            role: Some("unrestricted".into()),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "unrestricted" }));

        let parsed: AuthClaims = serde_json::from_str("{}").unwrap();
        assert!(parsed.exp.is_none());
        assert!(parsed.role.is_none());
    }
}
