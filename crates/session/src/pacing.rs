//! Paced reveal of round results.

use std::time::Duration;

use crate::term::Output;
use crate::types::Line;

/// Emits chunks of lines with a fixed pause between consecutive chunks.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Reveal `chunks` in order. Empty chunks are skipped and there is no
    /// pause after the last one.
    pub async fn reveal<O: Output + ?Sized>(&self, out: &mut O, chunks: &[Vec<Line>]) {
        let mut first = true;
        for chunk in chunks.iter().filter(|c| !c.is_empty()) {
            if !first && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            first = false;
            out.emit_all(chunk);
        }
    }
}
