//! Terminal restore: scoped screen leases plus a process-wide panic hook.
//!
//! Raw mode and the alternate screen are tracked in atomics so the terminal
//! can be restored from any exit path, including a panic unwinding through a
//! prompt.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use anyhow::Result;
use crossterm::{
    cursor, execute,
    style::{Attribute, ResetColor, SetAttribute},
    terminal,
};

use crate::renderer::Screen;

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Enable raw mode and switch to the alternate screen, recording both.
pub fn enter_raw_screen(out: &mut impl Write) -> Result<()> {
    terminal::enable_raw_mode()?;
    RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap
    )?;
    ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);
    Ok(())
}

/// Undo whatever [`enter_raw_screen`] did. Safe to call repeatedly.
pub fn restore_terminal() {
    let mut stdout = io::stdout();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(
            stdout,
            ResetColor,
            SetAttribute(Attribute::Reset),
            terminal::EnableLineWrap,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
    }
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = terminal::disable_raw_mode();
    }
    let _ = stdout.flush();
}

pub fn is_raw_screen_active() -> bool {
    RAW_MODE_ENABLED.load(Ordering::SeqCst) || ALT_SCREEN_ENABLED.load(Ordering::SeqCst)
}

/// Restore the terminal before the default panic output is printed.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(%location, "panic: {info}");
            previous(info);
        }));
    });
}

/// Exclusive use of a [`Screen`] in raw mode for the duration of a prompt.
///
/// Dropping the lease releases the screen, so early returns and `?` restore
/// the terminal too.
pub struct ScreenLease<'a, S: Screen + ?Sized> {
    screen: &'a mut S,
    released: bool,
}

impl<'a, S: Screen + ?Sized> ScreenLease<'a, S> {
    pub fn acquire(screen: &'a mut S) -> Result<Self> {
        screen.acquire()?;
        Ok(Self {
            screen,
            released: false,
        })
    }

    pub fn screen(&mut self) -> &mut S {
        &mut *self.screen
    }

    /// Release now and report failures; `Drop` only logs them.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.screen.release()
    }
}

impl<S: Screen + ?Sized> Drop for ScreenLease<'_, S> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(err) = self.screen.release() {
                tracing::warn!(error = %err, "failed to release terminal");
            }
        }
    }
}
