// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown.
//!
//! A single `watch` flag flips from `false` to `true` exactly once, either on
//! an OS signal (SIGTERM, SIGINT, SIGQUIT; Ctrl+C off Unix) or on a manual
//! request. The HTTP server drains on it, then the runtime closes backends.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Shared shutdown flag.
///
/// ```ignore
/// let coordinator = ShutdownCoordinator::new();
/// tokio::spawn({
///     let coordinator = coordinator.clone();
///     async move { coordinator.wait_for_os_signal().await }
/// });
/// server.serve(listener, coordinator.shutdown_signal().wait()).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    flag: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator in the running state.
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Returns a future-producing handle that resolves on shutdown.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.flag.subscribe(),
        }
    }

    /// Requests shutdown. Returns `true` for the call that flipped the flag.
    pub fn initiate_shutdown(&self) -> bool {
        let first = self.flag.send_if_modified(|stopping| {
            if *stopping {
                false
            } else {
                *stopping = true;
                true
            }
        });
        if first {
            info!("Shutdown initiated");
        }
        first
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.flag.borrow()
    }

    /// Waits for a termination signal, then requests shutdown.
    pub async fn wait_for_os_signal(&self) {
        let mut signal = self.shutdown_signal();
        tokio::select! {
            _ = wait_for_signal() => {
                self.initiate_shutdown();
            }
            _ = signal.changed() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("shutdown_initiated", &self.is_shutdown_initiated())
            .field("listeners", &self.flag.receiver_count())
            .finish()
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint, mut sigquit) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
        signal(SignalKind::quit()),
    ) {
        (Ok(term), Ok(int), Ok(quit)) => (term, int, quit),
        _ => {
            warn!("Cannot install Unix signal handlers, listening for Ctrl+C only");
            return wait_for_ctrl_c().await;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
        _ = sigquit.recv() => "SIGQUIT",
    };
    info!(signal = name, "Termination signal received");
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl+C; shutdown must be requested manually");
        std::future::pending::<()>().await;
    }
    info!(signal = "ctrl-c", "Termination signal received");
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// One listener on the shutdown flag.
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown is requested, immediately if it already was.
    pub async fn wait(mut self) {
        self.changed().await;
    }

    async fn changed(&mut self) {
        // An error means every coordinator is gone, which also ends the run.
        let _ = self.receiver.wait_for(|stopping| *stopping).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_resolves_after_initiation() {
        let coordinator = ShutdownCoordinator::new();
        let waiter = tokio::spawn(coordinator.shutdown_signal().wait());

        assert!(!coordinator.is_shutdown_initiated());
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());

        let result = tokio::time::timeout(Duration::from_millis(100), waiter).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_signal_created_after_shutdown_is_ready() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        let result =
            tokio::time::timeout(Duration::from_millis(100), coordinator.shutdown_signal().wait())
                .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_only_first_initiation_counts() {
        let coordinator = ShutdownCoordinator::new();
        let clone = coordinator.clone();

        assert!(coordinator.initiate_shutdown());
        assert!(!clone.initiate_shutdown());
        assert!(clone.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_os_signal_wait_ends_on_manual_shutdown() {
        let coordinator = ShutdownCoordinator::new();
        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_os_signal().await })
        };

        coordinator.initiate_shutdown();
        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok());
    }
}
