//! The selection prompt driver.
//!
//! [`select`] runs one prompt to completion: it leases the screen, feeds keys
//! into a [`SelectionSession`] and redraws a full frame after every change.
//! Without an interactive terminal it resolves to the first item at once.

use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

use crate::core::{SelectionSession, Step};
use crate::guard::ScreenLease;
use crate::input::KeySource;
use crate::menu_view::{MenuView, Viewport};
use crate::renderer::Screen;
use crate::types::{Key, Line, SelectableItem, DEFAULT_CONFIRM_DELAY_MS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("prompt has no items to choose from")]
    NoItems,
}

/// What to ask.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub header: String,
    pub preamble: Vec<Line>,
    pub items: Vec<SelectableItem>,
}

impl Prompt {
    pub fn new(header: impl Into<String>, items: Vec<SelectableItem>) -> Self {
        Self {
            header: header.into(),
            preamble: Vec::new(),
            items,
        }
    }

    pub fn with_preamble(mut self, preamble: Vec<Line>) -> Self {
        self.preamble = preamble;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Pause between a digit jump and resolution.
    pub confirm_delay: Duration,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            confirm_delay: Duration::from_millis(DEFAULT_CONFIRM_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceVia {
    Enter,
    Digit,
    /// No usable terminal or input ended; picked without a keypress.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub index: usize,
    pub item: SelectableItem,
    pub via: ChoiceVia,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Chosen(Choice),
    /// Escape or Ctrl-C.
    Aborted,
}

impl Outcome {
    pub fn choice(&self) -> Option<&Choice> {
        match self {
            Outcome::Chosen(choice) => Some(choice),
            Outcome::Aborted => None,
        }
    }
}

fn chosen(prompt: &Prompt, index: usize, via: ChoiceVia) -> Outcome {
    Outcome::Chosen(Choice {
        index,
        item: prompt.items[index].clone(),
        via,
    })
}

/// Run one prompt and return the user's choice.
pub async fn select<K, S>(
    keys: &mut K,
    screen: &mut S,
    prompt: &Prompt,
    options: &SelectOptions,
) -> Result<Outcome>
where
    K: KeySource + ?Sized,
    S: Screen + ?Sized,
{
    if prompt.items.is_empty() {
        return Err(SelectError::NoItems.into());
    }

    if !keys.is_interactive() || !screen.is_interactive() {
        tracing::info!(
            header = %prompt.header,
            item = %prompt.items[0].id,
            "no interactive terminal, selecting first item"
        );
        return Ok(chosen(prompt, 0, ChoiceVia::Fallback));
    }

    let mut lease = match ScreenLease::acquire(screen) {
        Ok(lease) => lease,
        Err(err) => {
            tracing::info!(
                error = %err,
                item = %prompt.items[0].id,
                "raw mode unavailable, selecting first item"
            );
            return Ok(chosen(prompt, 0, ChoiceVia::Fallback));
        }
    };
    keys.reset()?;

    let view = MenuView::default();
    let (width, height) = lease.screen().size()?;
    let mut viewport = Viewport::new(width, height);
    let mut session = SelectionSession::new(
        prompt.items.len(),
        view.list_rows(height, prompt.preamble.len()),
    );

    let draw = |lease: &mut ScreenLease<'_, S>, session: &SelectionSession, viewport: Viewport| {
        let fb = view.render(
            &prompt.header,
            &prompt.preamble,
            &prompt.items,
            session,
            viewport,
        );
        lease.screen().present(&fb)
    };
    draw(&mut lease, &session, viewport)?;

    loop {
        let Some(key) = keys.next_key().await? else {
            let index = session.highlighted();
            tracing::warn!(
                item = %prompt.items[index].id,
                "input ended mid-prompt, taking highlighted item"
            );
            lease.release()?;
            return Ok(chosen(prompt, index, ChoiceVia::Fallback));
        };

        if let Key::Resize { width, height } = key {
            viewport = Viewport::new(width, height);
            session.set_viewport_rows(view.list_rows(height, prompt.preamble.len()));
            draw(&mut lease, &session, viewport)?;
            continue;
        }

        match session.apply(key) {
            Step::Redraw => draw(&mut lease, &session, viewport)?,
            Step::Resolve(index) => {
                lease.release()?;
                return Ok(chosen(prompt, index, ChoiceVia::Enter));
            }
            Step::Confirm(index) => {
                draw(&mut lease, &session, viewport)?;
                tokio::time::sleep(options.confirm_delay).await;
                lease.release()?;
                return Ok(chosen(prompt, index, ChoiceVia::Digit));
            }
            Step::Abort => {
                tracing::info!(header = %prompt.header, "prompt aborted");
                lease.release()?;
                return Ok(Outcome::Aborted);
            }
            Step::Ignored => {}
        }
    }
}
