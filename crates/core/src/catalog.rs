//! Catalog - turns engine payloads into ordered selectable items.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Bonus, CharacterSummary, ItemMeta, MoveData, SelectableItem};

/// Category used for roster entries.
pub const CHARACTER_CATEGORY: &str = "fighters";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("engine sent an empty list")]
    Empty,
    #[error("duplicate item id `{0}`")]
    DuplicateId(String),
}

/// Validate ids and order items by category.
///
/// Categories sort lexicographically; items keep engine order within their
/// category (the sort is stable).
pub fn categorize(mut items: Vec<SelectableItem>) -> Result<Vec<SelectableItem>, CatalogError> {
    if items.is_empty() {
        return Err(CatalogError::Empty);
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(item.id.as_str()) {
            return Err(CatalogError::DuplicateId(item.id.clone()));
        }
    }
    items.sort_by(|a, b| a.category.cmp(&b.category));
    Ok(items)
}

/// Net next-round bonus granted to moves of type `tag`.
pub fn bonus_for(tag: &str, bonuses: &[Bonus]) -> i32 {
    bonuses
        .iter()
        .filter(|b| b.kind == tag)
        .map(|b| b.amount)
        .sum()
}

/// Build the move prompt items, folding pending bonuses into item metadata.
pub fn move_items(
    moves: &[MoveData],
    next_round_bonus: &[Bonus],
) -> Result<Vec<SelectableItem>, CatalogError> {
    let items = moves
        .iter()
        .map(|m| SelectableItem {
            id: m.id.clone(),
            name: m.name.clone(),
            category: m.tag.clone(),
            description: m.description.clone(),
            meta: ItemMeta {
                range: m.range.clone(),
                modifier: m.modifier,
                bonus: bonus_for(&m.tag, next_round_bonus),
                equipment: m.requires.clone(),
            },
        })
        .collect();
    categorize(items)
}

/// Build the character prompt items in roster order.
pub fn character_items(roster: &[CharacterSummary]) -> Result<Vec<SelectableItem>, CatalogError> {
    let items = roster
        .iter()
        .map(|c| {
            let mut item = SelectableItem::new(&c.slug, &c.name, CHARACTER_CATEGORY);
            item.description = c.description.clone();
            item
        })
        .collect();
    categorize(items)
}

/// Whether `index` is the first item of its category run.
pub fn starts_category(items: &[SelectableItem], index: usize) -> bool {
    match index {
        0 => !items.is_empty(),
        i if i < items.len() => items[i - 1].category != items[i].category,
        _ => false,
    }
}
