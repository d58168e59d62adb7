//! Terminal state guards with panic-safe cleanup.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static flag to track if raw mode is active (for panic handler)
pub(crate) static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Static flag to track if the cursor is hidden (for panic handler)
pub(crate) static CURSOR_HIDDEN: AtomicBool = AtomicBool::new(false);

/// Guard that ensures terminal is restored to normal mode on drop.
/// This handles both normal exits and panics.
pub struct RawModeGuard {
    /// Whether this guard is responsible for cleanup
    active: bool,
}

impl RawModeGuard {
    /// Enter raw mode and return a guard that will restore it on drop.
    ///
    /// # Errors
    /// Returns an error if enabling raw mode fails
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { active: true })
    }

    /// Manually exit raw mode without dropping the guard.
    /// After calling this, the guard's drop will be a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
            disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
            // Best-effort cleanup - ignore errors during drop
            let _ = disable_raw_mode();
        }
    }
}

/// Hides the cursor on a writer and shows it again on drop.
///
/// Used around loop playback so an interrupted run never leaves the
/// cursor invisible.
pub struct HiddenCursor<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> HiddenCursor<'a, W> {
    pub fn hide(out: &'a mut W) -> io::Result<Self> {
        install_panic_hook();

        crossterm::queue!(out, crossterm::cursor::Hide)?;
        CURSOR_HIDDEN.store(true, Ordering::SeqCst);
        Ok(Self { out })
    }

    pub fn writer(&mut self) -> &mut W {
        self.out
    }
}

impl<W: Write> Drop for HiddenCursor<'_, W> {
    fn drop(&mut self) {
        CURSOR_HIDDEN.store(false, Ordering::SeqCst);
        let _ = crossterm::queue!(self.out, crossterm::cursor::Show);
        let _ = self.out.flush();
    }
}

/// Install a panic hook that restores terminal state before panicking.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = disable_raw_mode();
        }
        if CURSOR_HIDDEN.swap(false, Ordering::SeqCst) {
            let _ = crossterm::execute!(io::stdout(), crossterm::style::ResetColor, crossterm::cursor::Show);
        }

        original_hook(panic_info);
    }));
}
