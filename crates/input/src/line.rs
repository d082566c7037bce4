//! Cooked line input (player name, room code) outside of raw mode.

use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[async_trait(?Send)]
pub trait LineSource {
    /// Next line without its terminator. `Ok(None)` at end of input.
    async fn read_line(&mut self) -> Result<Option<String>>;
}

pub struct StdinLines {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl LineSource for StdinLines {
    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait(?Send)]
impl LineSource for ScriptedLines {
    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Read a trimmed, non-empty line; falls back to `default` on blank input or
/// end of input.
pub async fn read_or_default<L: LineSource + ?Sized>(lines: &mut L, default: &str) -> Result<String> {
    let line = lines.read_line().await?;
    Ok(line
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| default.to_string()))
}
