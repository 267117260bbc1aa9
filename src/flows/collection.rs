//! Ordered flow collection with stable per-record identities.

use std::collections::HashSet;

use super::types::{FlowId, FlowRecord, NodeRecord, SankeyData};

/// Insertion-ordered list of flows.
///
/// Each record gets a [`FlowId`] when it enters the collection, so the list
/// panel can delete the row that was clicked even when two rows are identical.
#[derive(Debug, Clone, Default)]
pub struct FlowCollection {
    entries: Vec<(FlowId, FlowRecord)>,
    next_id: u64,
}

impl FlowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = FlowRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            collection.push(record);
        }
        collection
    }

    /// Append a record and return the id it was given.
    pub fn push(&mut self, record: FlowRecord) -> FlowId {
        let id = FlowId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, record));
        id
    }

    /// Remove the record with the given id.
    pub fn remove(&mut self, id: FlowId) -> Option<FlowRecord> {
        let index = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        self.remove_at(index)
    }

    /// Remove the record at `index`, keeping the order of the others.
    pub fn remove_at(&mut self, index: usize) -> Option<FlowRecord> {
        if index < self.entries.len() {
            Some(self.entries.remove(index).1)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&FlowRecord> {
        self.entries.get(index).map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowId, &FlowRecord)> {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    pub fn records(&self) -> impl Iterator<Item = &FlowRecord> {
        self.entries.iter().map(|(_, record)| record)
    }

    /// Owned copy of the records, in insertion order.
    pub fn to_records(&self) -> Vec<FlowRecord> {
        self.records().cloned().collect()
    }

    /// Distinct labels in first-seen order (source before target).
    pub fn nodes(&self) -> Vec<NodeRecord> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for record in self.records() {
            for label in [&record.source, &record.target] {
                if seen.insert(label.as_str()) {
                    nodes.push(NodeRecord { id: label.clone() });
                }
            }
        }
        nodes
    }

    /// Nodes and links in the shape the chart consumes.
    pub fn chart_data(&self) -> SankeyData {
        SankeyData {
            nodes: self.nodes(),
            links: self.to_records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::seed_flows;

    fn labels(nodes: &[NodeRecord]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn nodes_are_distinct_in_first_seen_order() {
        let collection = FlowCollection::from_records(seed_flows());
        assert_eq!(
            labels(&collection.nodes()),
            vec!["Applications", "Interviews", "Rejected", "Offers"]
        );
    }

    #[test]
    fn nodes_cover_every_label_exactly_once() {
        let collection = FlowCollection::from_records(vec![
            FlowRecord::new("A", "B", 1.0),
            FlowRecord::new("B", "A", 1.0),
            FlowRecord::new("C", "A", 1.0),
            FlowRecord::new("A", "B", 4.0),
        ]);
        let nodes = collection.nodes();
        let expected: HashSet<&str> = ["A", "B", "C"].into();
        let actual: HashSet<&str> = labels(&nodes).into_iter().collect();
        assert_eq!(actual, expected);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn empty_collection_has_no_nodes() {
        assert!(FlowCollection::new().nodes().is_empty());
        assert!(FlowCollection::new().chart_data().is_empty());
    }

    #[test]
    fn remove_at_keeps_relative_order() {
        let mut collection = FlowCollection::from_records(vec![
            FlowRecord::new("A", "B", 1.0),
            FlowRecord::new("B", "C", 2.0),
            FlowRecord::new("C", "D", 3.0),
            FlowRecord::new("D", "E", 4.0),
        ]);
        let removed = collection.remove_at(1);
        assert_eq!(removed, Some(FlowRecord::new("B", "C", 2.0)));
        let values: Vec<f64> = collection.records().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn remove_at_out_of_range_is_noop() {
        let mut collection = FlowCollection::from_records(seed_flows());
        assert_eq!(collection.remove_at(3), None);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn remove_by_id_targets_the_clicked_duplicate() {
        let mut collection = FlowCollection::new();
        let first = collection.push(FlowRecord::new("A", "B", 1.0));
        let second = collection.push(FlowRecord::new("A", "B", 1.0));
        assert_ne!(first, second);

        collection.remove(second);
        let ids: Vec<FlowId> = collection.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![first]);
        assert_eq!(collection.remove(second), None);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut collection = FlowCollection::new();
        let a = collection.push(FlowRecord::new("A", "B", 1.0));
        collection.remove(a);
        let b = collection.push(FlowRecord::new("A", "B", 1.0));
        assert_ne!(a, b);
    }
}
