//! Round breakdown - what happened in a resolved round, chunked for paced
//! reveal, plus the end-of-game summary.

use crate::status::{bonus_summary, format_bonuses, restriction_list};
use crate::types::{Line, RoundData, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Victory,
    Defeat,
}

pub const NO_DAMAGE_LINE: &str = "Positioning moves, no damage this round";

/// Damage lines for one round from both sides' snapshots.
///
/// Our `total_score` is damage dealt, the opponent's is damage taken. A side
/// that attempted a scoring move (score present) but ended with a total of
/// zero or less gets a "no damage" line instead.
pub fn damage_breakdown(mine: &RoundData, theirs: &RoundData) -> Vec<Line> {
    let mut lines = Vec::new();

    if !mine.result.name.is_empty() {
        let text = match &mine.result.range {
            Some(range) => format!("Result: {} ({range} range)", mine.result.name),
            None => format!("Result: {}", mine.result.name),
        };
        lines.push(Line::new(Tone::Info, text));
    }

    if !mine.attempted_hit() && !theirs.attempted_hit() && mine.total_score <= 0 && theirs.total_score <= 0 {
        lines.push(Line::new(Tone::Dim, NO_DAMAGE_LINE));
        return lines;
    }

    if mine.total_score > 0 {
        lines.push(Line::new(
            Tone::Good,
            format!("You dealt {} damage{}", mine.total_score, score_detail(mine)),
        ));
    } else if mine.attempted_hit() {
        lines.push(Line::new(Tone::Warn, "Your hit landed but did no damage"));
    }

    if theirs.total_score > 0 {
        lines.push(Line::new(
            Tone::Bad,
            format!("You took {} damage{}", theirs.total_score, score_detail(theirs)),
        ));
    } else if theirs.attempted_hit() {
        lines.push(Line::new(Tone::Info, "Opponent's hit landed but did no damage"));
    }

    lines
}

fn score_detail(side: &RoundData) -> String {
    match side.score {
        Some(score) if side.move_modifier != 0 || side.bonus != 0 => format!(
            " (score {score}, modifier {:+}, bonus {:+})",
            side.move_modifier, side.bonus
        ),
        _ => String::new(),
    }
}

/// Restrictions and bonuses that apply to our next move.
pub fn next_round_lines(mine: &RoundData) -> Vec<Line> {
    let mut lines = Vec::new();
    let restrictions = restriction_list(&mine.result);
    if !restrictions.is_empty() {
        lines.push(Line::new(
            Tone::Warn,
            format!("Next round restrictions: {}", restrictions.join(", ")),
        ));
    }
    if let Some(bonuses) = bonus_summary(&mine.next_round_bonus) {
        lines.push(Line::new(
            Tone::Good,
            format!("Next round bonuses: {}", format_bonuses(&bonuses)),
        ));
    }
    if lines.is_empty() {
        lines.push(Line::new(Tone::Dim, "No restrictions or bonuses next round"));
    }
    lines
}

/// Paced chunks for a resolved round, in reveal order: maneuver
/// acknowledgement, moves used, damage, next-round constraints.
///
/// The health chunk is appended by the caller, which owns the engine view.
pub fn round_chunks(round: u32, mine: &RoundData, theirs: &RoundData) -> Vec<Vec<Line>> {
    vec![
        vec![
            Line::blank(),
            Line::new(Tone::Accent, format!("Round {round}: both fighters commit")),
        ],
        vec![
            Line::plain(format!("You used {}", mine.my_move.name)),
            Line::plain(format!("Opponent used {}", mine.opponent_move.name)),
        ],
        damage_breakdown(mine, theirs),
        next_round_lines(mine),
    ]
}

/// Outcome block lines (unframed).
pub fn outcome_lines(outcome: GameOutcome, rounds: u32, opponent: Option<&str>) -> Vec<Line> {
    let foe = opponent.filter(|n| !n.is_empty()).unwrap_or("your opponent");
    match outcome {
        GameOutcome::Victory => vec![
            Line::new(Tone::Good, "VICTORY"),
            Line::plain(format!("You defeated {foe} after {rounds} rounds")),
        ],
        GameOutcome::Defeat => vec![
            Line::new(Tone::Bad, "DEFEAT"),
            Line::plain(format!("You fell to {foe} after {rounds} rounds")),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bonus, MoveRef, RoundResult};

    fn side(score: Option<i32>, total: i32) -> RoundData {
        RoundData {
            my_move: MoveRef {
                id: "m1".into(),
                name: "Thrust".into(),
                tag: "offense".into(),
            },
            opponent_move: MoveRef {
                id: "m2".into(),
                name: "Parry".into(),
                tag: "defense".into(),
            },
            score,
            total_score: total,
            ..RoundData::default()
        }
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn dealt_without_taken() {
        let lines = texts(&damage_breakdown(&side(Some(4), 5), &side(None, 0)));
        assert!(lines.iter().any(|l| l.starts_with("You dealt 5 damage")));
        assert!(!lines.iter().any(|l| l.starts_with("You took")));
    }

    #[test]
    fn attempted_hit_without_damage() {
        let lines = texts(&damage_breakdown(&side(Some(0), 0), &side(Some(3), 3)));
        assert!(lines.contains(&"Your hit landed but did no damage".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("You took 3 damage")));
        assert!(!lines.contains(&NO_DAMAGE_LINE.to_string()));
    }

    #[test]
    fn neither_attempted_is_neutral() {
        let lines = texts(&damage_breakdown(&side(None, 0), &side(None, 0)));
        assert_eq!(lines, vec![NO_DAMAGE_LINE.to_string()]);
    }

    #[test]
    fn detail_shows_modifiers() {
        let mut mine = side(Some(3), 5);
        mine.move_modifier = 1;
        mine.bonus = 1;
        let lines = texts(&damage_breakdown(&mine, &side(None, 0)));
        assert_eq!(lines[0], "You dealt 5 damage (score 3, modifier +1, bonus +1)");
    }

    #[test]
    fn chunks_in_reveal_order() {
        let mut mine = side(Some(2), 2);
        mine.result = RoundResult {
            name: "Clean hit".into(),
            range: Some("close".into()),
            restrict: vec![],
            allow_only: vec!["defense".into()],
        };
        mine.next_round_bonus = vec![Bonus::new("offense", 1)];
        let chunks = round_chunks(3, &mine, &side(None, 0));
        assert_eq!(chunks.len(), 4);
        assert!(chunks[0][1].text.contains("Round 3"));
        assert_eq!(chunks[1][0].text, "You used Thrust");
        assert_eq!(chunks[2][0].text, "Result: Clean hit (close range)");
        assert_eq!(
            texts(&chunks[3]),
            vec![
                "Next round restrictions: Only defense",
                "Next round bonuses: offense +1"
            ]
        );
    }

    #[test]
    fn outcome_names_opponent() {
        let lines = outcome_lines(GameOutcome::Victory, 4, Some("Zed"));
        assert_eq!(lines[0].text, "VICTORY");
        assert_eq!(lines[1].text, "You defeated Zed after 4 rounds");
        let lines = outcome_lines(GameOutcome::Defeat, 1, None);
        assert!(lines[1].text.contains("your opponent"));
    }
}
