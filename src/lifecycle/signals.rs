//! OS signal handling.
//!
//! Ctrl-C triggers the shared [`Shutdown`]. `main` runs the command under
//! [`Shutdown::cancellable`], so the trigger ends the process even outside
//! polling loops. Once installed, the listener replaces the default SIGINT
//! behavior for the rest of the process.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers `shutdown` on the first Ctrl-C.
pub fn spawn_ctrl_c_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received, cancelling");
                shutdown.trigger();
            }
            Err(e) => tracing::warn!(error = %e, "Unable to listen for Ctrl-C"),
        }
    })
}
