//! Shutdown state.
//!
//! Ctrl+C either exits at once (nothing to wind down) or asks the running
//! watch loop to stop, letting an in-flight rebuild finish its writes.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::watch::StopHandle;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Stop handle of the running watch loop
static WATCH_STOP: OnceLock<StopHandle> = OnceLock::new();

/// Install the global Ctrl+C handler. Call once at program start.
///
/// - Before `register_watch()`: exit immediately
/// - After `register_watch()`: stop the watch loop gracefully
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let repeated = SHUTDOWN.swap(true, Ordering::SeqCst);

        match WATCH_STOP.get() {
            Some(handle) if !repeated => {
                crate::log!("watch"; "shutting down...");
                handle.stop();
            }
            // A one-shot build writes atomically, so dying mid-build leaves
            // every output either old or new. Second Ctrl+C forces exit.
            _ => std::process::exit(130),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Route Ctrl+C to the watch loop instead of exiting.
pub fn register_watch(handle: StopHandle) {
    let _ = WATCH_STOP.set(handle);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}
