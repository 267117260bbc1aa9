//! Flow data types shared by storage, layout and UI.

use serde::{Deserialize, Serialize};

/// A single directed flow between two labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source: String,
    pub target: String,
    pub value: f64,
}

impl FlowRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }

    /// Whether this record could have been produced by the input panel.
    pub fn is_valid(&self) -> bool {
        !self.source.trim().is_empty()
            && !self.target.trim().is_empty()
            && self.value.is_finite()
            && self.value >= 0.0
    }

    /// Row text for the flow list.
    pub fn describe(&self) -> String {
        format!("{} → {} : {}", self.source, self.target, format_value(self.value))
    }
}

/// Format a value without a trailing `.0` for whole numbers.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Session-local identity of a record inside a [`FlowCollection`](super::FlowCollection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(pub u64);

/// A diagram node, derived from the labels the flows mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRecord {
    pub id: String,
}

/// Everything the chart needs: distinct nodes plus the links between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyData {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<FlowRecord>,
}

impl SankeyData {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Records shown on first launch, before anything was saved.
pub fn seed_flows() -> Vec<FlowRecord> {
    vec![
        FlowRecord::new("Applications", "Interviews", 5.0),
        FlowRecord::new("Applications", "Rejected", 20.0),
        FlowRecord::new("Interviews", "Offers", 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_uses_arrow_and_integer_values() {
        let record = FlowRecord::new("Applications", "Interviews", 5.0);
        assert_eq!(record.describe(), "Applications → Interviews : 5");
    }

    #[test]
    fn describe_keeps_fractional_values() {
        let record = FlowRecord::new("A", "B", 2.5);
        assert_eq!(record.describe(), "A → B : 2.5");
    }

    #[test]
    fn validity_rejects_blank_labels_and_bad_values() {
        assert!(FlowRecord::new("A", "B", 0.0).is_valid());
        assert!(!FlowRecord::new(" ", "B", 1.0).is_valid());
        assert!(!FlowRecord::new("A", "", 1.0).is_valid());
        assert!(!FlowRecord::new("A", "B", -1.0).is_valid());
        assert!(!FlowRecord::new("A", "B", f64::NAN).is_valid());
    }

    #[test]
    fn record_serializes_as_plain_triple() {
        let json = serde_json::to_value(FlowRecord::new("A", "B", 3.0)).unwrap();
        assert_eq!(json, serde_json::json!({"source": "A", "target": "B", "value": 3.0}));
    }

    #[test]
    fn seed_matches_documented_defaults() {
        let seed = seed_flows();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed[1], FlowRecord::new("Applications", "Rejected", 20.0));
    }
}
