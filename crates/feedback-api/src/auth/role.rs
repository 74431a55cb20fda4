// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Roles and the operations they authorize.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// The closed set of roles a credential can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// May only read.
    ReadOnly,
    /// May only write.
    WriteOnly,
    /// May do anything.
    #[default]
    Unrestricted,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 3] = [Role::ReadOnly, Role::WriteOnly, Role::Unrestricted];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ReadOnly => "read-only",
            Role::WriteOnly => "write-only",
            Role::Unrestricted => "unrestricted",
        }
    }

    /// Parses a wire name. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }

    /// Returns `true` if this role may perform `operation`.
    pub fn permits(&self, operation: Operation) -> bool {
        match self {
            Role::Unrestricted => true,
            Role::ReadOnly => operation == Operation::Read,
            Role::WriteOnly => operation == Operation::Write,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "role must be one of read-only, write-only or unrestricted, got '{}'",
                s
            )
        })
    }
}

// =============================================================================
// Operation
// =============================================================================

/// The kind of operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// GET-like.
    Read,
    /// POST-like.
    Write,
    /// Anything else.
    Other,
}

impl Operation {
    /// Classifies an HTTP method.
    pub fn from_method(method: &Method) -> Self {
        if method == Method::GET || method == Method::HEAD {
            Operation::Read
        } else if method == Method::POST {
            Operation::Write
        } else {
            Operation::Other
        }
    }

    /// Returns the operation name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Other => "other",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("read-only"), Some(Role::ReadOnly));
        assert_eq!(Role::parse("write-only"), Some(Role::WriteOnly));
        assert_eq!(Role::parse("unrestricted"), Some(Role::Unrestricted));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Read-Only"), None);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Unrestricted);
    }

    #[test]
    fn test_role_permits() {
        assert!(Role::ReadOnly.permits(Operation::Read));
        assert!(!Role::ReadOnly.permits(Operation::Write));
        assert!(!Role::WriteOnly.permits(Operation::Read));
        assert!(Role::WriteOnly.permits(Operation::Write));
        assert!(Role::Unrestricted.permits(Operation::Read));
        assert!(Role::Unrestricted.permits(Operation::Write));
        assert!(Role::Unrestricted.permits(Operation::Other));
        assert!(!Role::ReadOnly.permits(Operation::Other));
    }

    #[test]
    fn test_operation_from_method() {
        assert_eq!(Operation::from_method(&Method::GET), Operation::Read);
        assert_eq!(Operation::from_method(&Method::POST), Operation::Write);
        assert_eq!(Operation::from_method(&Method::DELETE), Operation::Other);
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::WriteOnly).unwrap();
        assert_eq!(json, "\"write-only\"");
    }
}
