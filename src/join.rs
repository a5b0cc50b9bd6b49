//! Outer-left join of observations with category styles

use crate::data::{CategoryStyle, Observation};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// One observation combined with one matching style row.
/// `color` and `shape` are `None` when the category has no style row.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub observation: Observation,
    pub color: Option<String>,
    pub shape: Option<u8>,
}

impl JoinedRecord {
    pub fn category(&self) -> &str {
        &self.observation.population
    }
}

/// Join on the population key.
///
/// Output order: all matches of left row 1 in right-table order, then all
/// matches of left row 2, and so on. A key with k right rows yields k
/// records per left row; a key with no right row yields the left row once.
pub fn join(left: &[Observation], right: &[CategoryStyle]) -> Vec<JoinedRecord> {
    let mut buckets: HashMap<&str, Vec<&CategoryStyle>> = HashMap::new();
    for style in right {
        buckets.entry(style.population.as_str()).or_default().push(style);
    }

    let mut joined = Vec::with_capacity(left.len());
    for obs in left {
        match buckets.get(obs.population.as_str()) {
            Some(matches) => {
                for style in matches {
                    joined.push(JoinedRecord {
                        observation: obs.clone(),
                        color: Some(style.color.clone()),
                        shape: Some(style.shape),
                    });
                }
            }
            None => joined.push(JoinedRecord {
                observation: obs.clone(),
                color: None,
                shape: None,
            }),
        }
    }

    let fan_out = joined.len().saturating_sub(left.len());
    tracing::debug!(
        left = left.len(),
        right = right.len(),
        joined = joined.len(),
        fan_out,
        "joined observations with styles"
    );
    joined
}

/// Agreement between the key sets of the two tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyCoverage {
    /// Left keys without any right row, first-seen order
    pub unmatched: Vec<String>,
    /// Right keys no left row uses, first-seen order
    pub unused: Vec<String>,
}

impl KeyCoverage {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty() && self.unused.is_empty()
    }

    /// Turn a mismatch into `JoinKeyMismatch`
    pub fn into_result(self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(Error::JoinKeyMismatch {
                unmatched: self.unmatched,
                unused: self.unused,
            })
        }
    }
}

pub fn check_keys(left: &[Observation], right: &[CategoryStyle]) -> KeyCoverage {
    let left_keys: HashSet<&str> = left.iter().map(|o| o.population.as_str()).collect();
    let right_keys: HashSet<&str> = right.iter().map(|s| s.population.as_str()).collect();

    KeyCoverage {
        unmatched: distinct_missing(left.iter().map(|o| o.population.as_str()), &right_keys),
        unused: distinct_missing(right.iter().map(|s| s.population.as_str()), &left_keys),
    }
}

fn distinct_missing<'a>(keys: impl Iterator<Item = &'a str>, other: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.filter(|k| !other.contains(k) && seen.insert(*k))
        .map(str::to_string)
        .collect()
}
