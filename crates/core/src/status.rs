//! Game state renderer - health bars, bonus and restriction summaries.
//!
//! Everything here is a pure function from engine data to text; colour is
//! expressed as a [`Tone`] and applied by the display layer.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use crate::types::{Bonus, Combatant, EngineView, Line, RoundData, RoundResult, Tone};

pub const BAR_FILLED: char = '█';
pub const BAR_EMPTY: char = '░';

/// Terminal columns reserved for the name in [`combatant_line`].
pub const NAME_COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTier {
    Low,
    Mid,
    High,
}

impl HealthTier {
    pub fn tone(self) -> Tone {
        match self {
            HealthTier::Low => Tone::Bad,
            HealthTier::Mid => Tone::Warn,
            HealthTier::High => Tone::Good,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthBar {
    pub filled: usize,
    pub empty: usize,
    pub tier: HealthTier,
}

impl HealthBar {
    pub fn len(&self) -> usize {
        self.filled + self.empty
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for HealthBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.filled {
            write!(f, "{BAR_FILLED}")?;
        }
        for _ in 0..self.empty {
            write!(f, "{BAR_EMPTY}")?;
        }
        Ok(())
    }
}

/// Health bar of `length` segments.
///
/// The fill ratio is clamped to `[0, 1]`, so overhealed or negative values
/// never break the bar; `max <= 0` renders an empty low-tier bar.
///
/// ```
/// use duel_core::status::{health_bar, HealthTier};
///
/// let bar = health_bar(7, 10, 20);
/// assert_eq!((bar.filled, bar.empty), (14, 6));
/// assert_eq!(bar.tier, HealthTier::High);
/// ```
pub fn health_bar(current: i32, max: i32, length: usize) -> HealthBar {
    let ratio = if max <= 0 {
        0.0
    } else {
        (f64::from(current) / f64::from(max)).clamp(0.0, 1.0)
    };
    let filled = ((length as f64) * ratio).round() as usize;
    let filled = filled.min(length);
    let tier = if ratio <= 0.3 {
        HealthTier::Low
    } else if ratio <= 0.6 {
        HealthTier::Mid
    } else {
        HealthTier::High
    };
    HealthBar {
        filled,
        empty: length - filled,
        tier,
    }
}

/// Net bonus per type in first-seen order; zero totals are dropped.
pub fn bonus_summary(entries: &[Bonus]) -> Option<Vec<Bonus>> {
    let mut totals: Vec<Bonus> = Vec::new();
    for entry in entries {
        match totals.iter_mut().find(|b| b.kind == entry.kind) {
            Some(total) => total.amount += entry.amount,
            None => totals.push(entry.clone()),
        }
    }
    totals.retain(|b| b.amount != 0);
    (!totals.is_empty()).then_some(totals)
}

/// Restrictions first, then `Only <X>` for each allow-only entry.
pub fn restriction_list(result: &RoundResult) -> Vec<String> {
    result
        .restrict
        .iter()
        .cloned()
        .chain(result.allow_only.iter().map(|x| format!("Only {x}")))
        .collect()
}

pub fn format_bonuses(bonuses: &[Bonus]) -> String {
    bonuses
        .iter()
        .map(|b| format!("{} {:+}", b.kind, b.amount))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Name  ██████░░░░  12/20`, toned by health tier.
pub fn combatant_line(c: &Combatant, bar_len: usize) -> Line {
    let bar = health_bar(c.health, c.max_health, bar_len);
    Line::new(
        bar.tier.tone(),
        format!(
            "{}{} {} {}/{}",
            c.name,
            " ".repeat(NAME_COLUMNS.saturating_sub(c.name.width())),
            bar,
            c.health.max(0),
            c.max_health
        ),
    )
}

/// Health lines for both sides.
pub fn health_lines(view: &EngineView, bar_len: usize) -> Vec<Line> {
    vec![
        combatant_line(&view.me, bar_len),
        combatant_line(&view.opponent, bar_len),
    ]
}

fn equipment_line(c: &Combatant) -> Option<Line> {
    let pieces: Vec<String> = c
        .equipment
        .pieces()
        .map(|(slot, item)| format!("{slot} {item}"))
        .collect();
    if pieces.is_empty() {
        return None;
    }
    Some(Line::new(
        Tone::Dim,
        format!("Equipment: {}", pieces.join(", ")),
    ))
}

/// Preamble for the move prompt.
pub fn tactical_lines(view: &EngineView, last_round: Option<&RoundData>, bar_len: usize) -> Vec<Line> {
    let mut lines = health_lines(view, bar_len);
    lines.extend(equipment_line(&view.me));

    if let Some(round) = last_round {
        let restrictions = restriction_list(&round.result);
        if !restrictions.is_empty() {
            lines.push(Line::new(
                Tone::Warn,
                format!("Restrictions: {}", restrictions.join(", ")),
            ));
        }
        if let Some(bonuses) = bonus_summary(&round.next_round_bonus) {
            lines.push(Line::new(
                Tone::Good,
                format!("Bonuses: {}", format_bonuses(&bonuses)),
            ));
        }
    }
    lines
}
