//! Column ordering rules.
//!
//! Every `(board, column)` partition keeps its card orders as the dense
//! sequence `1..=N`. The functions here take a snapshot of a partition and
//! compute the placement of the card being mutated plus the `±1` shifts the
//! other cards need. They never touch storage; the card service applies the
//! result inside a single transaction.

use super::{Card, Column};

/// A card's position within a partition snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub id: &'a str,
    pub order: i64,
}

impl<'a> From<&'a Card> for Slot<'a> {
    fn from(card: &'a Card) -> Self {
        Slot {
            id: &card.id,
            order: card.order,
        }
    }
}

/// An order adjustment for one card other than the one being mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub card_id: String,
    pub delta: i64,
}

/// Where the mutated card ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column: Column,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reindex {
    pub placement: Placement,
    pub shifts: Vec<Shift>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("newOrder must be between 1 and {max}, got {requested}")]
    OutOfRange { requested: i64, max: i64 },
}

/// True when the orders are exactly `{1, 2, ..., len}`.
pub fn is_contiguous<I>(orders: I) -> bool
where
    I: IntoIterator<Item = i64>,
{
    let mut sorted: Vec<i64> = orders.into_iter().collect();
    sorted.sort_unstable();
    sorted.iter().zip(1..).all(|(order, expected)| *order == expected)
}

/// Place a new card at the end of `column`.
pub fn append(column: Column, snapshot: &[Slot<'_>]) -> Placement {
    Placement {
        column,
        order: snapshot.len() as i64 + 1,
    }
}

/// Move a card from `current` to `target` within its own column.
///
/// `others` is the partition without the moving card, so the valid range is
/// `1..=others.len() + 1`.
pub fn reorder(
    column: Column,
    current: i64,
    others: &[Slot<'_>],
    target: i64,
) -> Result<Reindex, OrderingError> {
    let max = others.len() as i64 + 1;
    if target < 1 || target > max {
        return Err(OrderingError::OutOfRange {
            requested: target,
            max,
        });
    }

    let shifts = if target < current {
        shift_range(others, target..=current - 1, 1)
    } else if target > current {
        shift_range(others, current + 1..=target, -1)
    } else {
        Vec::new()
    };

    Ok(Reindex {
        placement: Placement {
            column,
            order: target,
        },
        shifts,
    })
}

/// Move a card out of its column and append it to `target_column`.
///
/// `source_rest` is the source partition without the moving card and
/// `target_snapshot` is the target partition, also without it. When the
/// source and target columns are the same both slices hold the same cards
/// and the card lands at the end of its own column.
pub fn move_to_column(
    current: i64,
    source_rest: &[Slot<'_>],
    target_column: Column,
    target_snapshot: &[Slot<'_>],
) -> Reindex {
    Reindex {
        placement: append(target_column, target_snapshot),
        shifts: close_gap(current, source_rest),
    }
}

/// Shifts that close the hole a removed card leaves at `current`.
pub fn remove(current: i64, rest: &[Slot<'_>]) -> Vec<Shift> {
    close_gap(current, rest)
}

fn close_gap(current: i64, rest: &[Slot<'_>]) -> Vec<Shift> {
    rest.iter()
        .filter(|slot| slot.order > current)
        .map(|slot| Shift {
            card_id: slot.id.to_string(),
            delta: -1,
        })
        .collect()
}

fn shift_range(
    slots: &[Slot<'_>],
    range: std::ops::RangeInclusive<i64>,
    delta: i64,
) -> Vec<Shift> {
    slots
        .iter()
        .filter(|slot| range.contains(&slot.order))
        .map(|slot| Shift {
            card_id: slot.id.to_string(),
            delta,
        })
        .collect()
}
