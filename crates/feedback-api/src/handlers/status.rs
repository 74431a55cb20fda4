// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Liveness probe.

/// GET /status
pub async fn status() -> &'static str {
    "Ok"
}
