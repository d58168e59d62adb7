//! Ctrl+C handling.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Cancellation flag set by the Ctrl+C handler.
pub fn cancel_flag() -> &'static AtomicBool {
    &CTRLC_RECEIVED
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        log::debug!("Received Ctrl+C, stopping playback");
    })
}

/// Install the logger: `warn` by default, overridden by `GIFZITTO_LOG`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("GIFZITTO_LOG", "warn"))
        .format_timestamp(None)
        .init();
}
