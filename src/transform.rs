use crate::category::{OrderedTable, Ranked};
use crate::join::JoinedRecord;
use std::collections::HashSet;

/// Negate one principal component across a table
///
/// Returns a new table with ranks and positions kept; applying it twice
/// yields the input.
pub fn flip_sign(table: &OrderedTable, component: usize) -> OrderedTable {
    let mut flipped = table.clone();
    for ranked in &mut flipped.records {
        if let Some(v) = ranked.record.observation.coords.get_mut(component) {
            *v = -*v;
        }
    }
    flipped
}

/// Records split by highlight membership, each side in input order
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub background: Vec<&'a Ranked<JoinedRecord>>,
    pub foreground: Vec<&'a Ranked<JoinedRecord>>,
}

impl<'a> Partition<'a> {
    /// Records in input order whose side matches `foreground`
    pub fn side(&self, foreground: bool) -> &[&'a Ranked<JoinedRecord>] {
        if foreground {
            &self.foreground
        } else {
            &self.background
        }
    }
}

/// Split records into background and foreground by category membership
///
/// Without a highlight set every record is foreground.
pub fn partition<'a, I>(records: I, highlight: Option<&[String]>) -> Partition<'a>
where
    I: IntoIterator<Item = &'a Ranked<JoinedRecord>>,
{
    let set: Option<HashSet<&str>> = highlight.map(|h| h.iter().map(String::as_str).collect());

    let mut out = Partition::default();
    for record in records {
        let in_front = match &set {
            Some(set) => set.contains(record.record.category()),
            None => true,
        };
        if in_front {
            out.foreground.push(record);
        } else {
            out.background.push(record);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::assign_order;
    use crate::data::Observation;

    fn record(id: &str, pop: &str, coords: Vec<f64>) -> JoinedRecord {
        JoinedRecord {
            observation: Observation {
                individual: id.to_string(),
                coords,
                population: pop.to_string(),
            },
            color: Some("red".to_string()),
            shape: Some(16),
        }
    }

    fn coords(table: &OrderedTable) -> Vec<Vec<f64>> {
        table.records.iter().map(|r| r.record.observation.coords.clone()).collect()
    }

    #[test]
    fn test_flip_sign_values() {
        let table = assign_order(vec![
            record("i1", "A", vec![0.1, -1.0]),
            record("i2", "B", vec![0.2, 0.3]),
        ]);
        let flipped = flip_sign(&table, 1);
        assert_eq!(coords(&flipped), vec![vec![0.1, 1.0], vec![0.2, -0.3]]);
        assert_eq!(flipped.order, table.order);
        // Input untouched
        assert_eq!(coords(&table)[0], vec![0.1, -1.0]);
    }

    #[test]
    fn test_flip_sign_self_inverse() {
        let table = assign_order(vec![
            record("i1", "A", vec![0.1, -1.0]),
            record("i2", "B", vec![-0.25, 0.3]),
        ]);
        let twice = flip_sign(&flip_sign(&table, 0), 0);
        assert_eq!(twice, table);
    }

    #[test]
    fn test_flip_sign_out_of_range_is_noop() {
        let table = assign_order(vec![record("i1", "A", vec![0.1, -1.0])]);
        assert_eq!(flip_sign(&table, 5), table);
    }

    fn ids(side: &[&Ranked<JoinedRecord>]) -> Vec<String> {
        side.iter()
            .map(|r| r.record.observation.individual.clone())
            .collect()
    }

    #[test]
    fn test_partition_by_membership() {
        let ordered = assign_order(vec![
            record("i1", "A", vec![0.0, 0.0]),
            record("i2", "B", vec![0.0, 0.0]),
            record("i3", "A", vec![0.0, 0.0]),
            record("i4", "C", vec![0.0, 0.0]),
        ]);
        let highlight = vec!["A".to_string(), "Z".to_string()];
        let parts = partition(&ordered.records, Some(highlight.as_slice()));

        assert_eq!(ids(parts.side(true)), vec!["i1", "i3"]);
        assert_eq!(ids(parts.side(false)), vec!["i2", "i4"]);
    }

    #[test]
    fn test_partition_without_highlight() {
        let ordered = assign_order(vec![
            record("i1", "A", vec![0.0, 0.0]),
            record("i2", "B", vec![0.0, 0.0]),
        ]);
        let parts = partition(&ordered.records, None);
        assert_eq!(parts.foreground.len(), 2);
        assert!(parts.background.is_empty());
    }
}
