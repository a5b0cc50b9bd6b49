//! First-seen categorical ordering

use crate::join::JoinedRecord;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Category levels ranked by first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryOrder {
    levels: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl CategoryOrder {
    /// Scan once; each new value takes the next unused rank
    pub fn from_first_seen<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut order = CategoryOrder::default();
        for value in values {
            order.intern(value);
        }
        order
    }

    /// Rank of `value`, adding it as the next level when unseen
    fn intern(&mut self, value: &str) -> usize {
        if let Some(&rank) = self.ranks.get(value) {
            return rank;
        }
        let rank = self.levels.len();
        self.ranks.insert(value.to_string(), rank);
        self.levels.push(value.to_string());
        rank
    }

    pub fn rank(&self, level: &str) -> Option<usize> {
        self.ranks.get(level).copied()
    }

    /// Levels in rank order
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Move `front` to the head in the given order, the rest keep their order.
    /// Unknown names are ignored.
    pub fn relevel(&self, front: &[&str]) -> CategoryOrder {
        let mut seen = Vec::new();
        for name in front {
            if self.ranks.contains_key(*name) && !seen.contains(name) {
                seen.push(*name);
            }
        }
        let rest = self.levels.iter().map(String::as_str).filter(|l| !seen.contains(l));
        CategoryOrder::from_first_seen(seen.iter().copied().chain(rest))
    }
}

/// Record tagged with its category rank and original position
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub position: usize,
    pub record: T,
}

/// Draw or sort order by rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// First-seen category first
    #[default]
    Ascending,
    /// First-seen category last, drawn on top
    Descending,
}

/// Joined table with its category order attached
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedTable {
    pub order: CategoryOrder,
    pub records: Vec<Ranked<JoinedRecord>>,
}

impl OrderedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records stably sorted by rank; ties keep their original position
    pub fn arrange(&self, direction: SortDirection) -> Vec<&Ranked<JoinedRecord>> {
        let mut sorted: Vec<&Ranked<JoinedRecord>> = self.records.iter().collect();
        match direction {
            SortDirection::Ascending => sorted.sort_by_key(|r| r.rank),
            SortDirection::Descending => sorted.sort_by_key(|r| Reverse(r.rank)),
        }
        sorted
    }
}

/// Compute first-seen order from the joined table and tag every record
pub fn assign_order(records: Vec<JoinedRecord>) -> OrderedTable {
    let mut order = CategoryOrder::default();
    let records = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| Ranked {
            rank: order.intern(record.category()),
            position,
            record,
        })
        .collect();
    tracing::debug!(levels = ?order.levels(), "assigned category order");

    OrderedTable { order, records }
}
