//! Input panel state: three text fields turned into a validated record.

use thiserror::Error;

use super::collection::FlowCollection;
use super::types::{FlowId, FlowRecord};

/// Why the input panel refused to add a flow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Fill in source, target and value")]
    Incomplete,

    #[error("'{0}' is not a number")]
    InvalidValue(String),

    #[error("Value must not be negative (got {0})")]
    NegativeValue(f64),
}

/// Text currently typed into the input panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowDraft {
    pub source: String,
    pub target: String,
    pub value: String,
}

impl FlowDraft {
    #[cfg(test)]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.source.is_empty() && self.target.is_empty() && self.value.is_empty()
    }

    /// Validate the fields without touching them.
    pub fn to_record(&self) -> Result<FlowRecord, DraftError> {
        if [&self.source, &self.target, &self.value]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(DraftError::Incomplete);
        }

        let raw = self.value.trim();
        let value: f64 = raw
            .parse()
            .map_err(|_| DraftError::InvalidValue(raw.to_string()))?;
        if !value.is_finite() {
            return Err(DraftError::InvalidValue(raw.to_string()));
        }
        if value < 0.0 {
            return Err(DraftError::NegativeValue(value));
        }

        Ok(FlowRecord::new(self.source.clone(), self.target.clone(), value))
    }

    /// Append the drafted record to `flows` and clear the fields.
    ///
    /// On error neither the collection nor the fields change.
    pub fn submit(&mut self, flows: &mut FlowCollection) -> Result<FlowId, DraftError> {
        let record = self.to_record()?;
        let id = flows.push(record);
        *self = Self::default();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn submit_appends_and_clears() {
        let mut flows = FlowCollection::new();
        let mut draft = FlowDraft::new("Applications", "Ghosted", "7");

        draft.submit(&mut flows).unwrap();

        assert_eq!(flows.len(), 1);
        assert_eq!(flows.get(0), Some(&FlowRecord::new("Applications", "Ghosted", 7.0)));
        assert!(draft.is_blank());
    }

    #[test]
    fn labels_are_kept_verbatim() {
        let mut flows = FlowCollection::new();
        let mut draft = FlowDraft::new(" Phone screen", "Onsite ", " 1.5 ");
        draft.submit(&mut flows).unwrap();
        let record = flows.get(0).unwrap();
        assert_eq!(record.source, " Phone screen");
        assert_eq!(record.target, "Onsite ");
        assert_eq!(record.value, 1.5);
    }

    #[rstest]
    #[case("", "B", "1")]
    #[case("A", "", "1")]
    #[case("A", "B", "")]
    #[case("   ", "B", "1")]
    fn missing_field_leaves_collection_unchanged(
        #[case] source: &str,
        #[case] target: &str,
        #[case] value: &str,
    ) {
        let mut flows = FlowCollection::new();
        let mut draft = FlowDraft::new(source, target, value);

        assert_eq!(draft.submit(&mut flows), Err(DraftError::Incomplete));
        assert!(flows.is_empty());
        assert_eq!(draft, FlowDraft::new(source, target, value));
    }

    #[rstest]
    #[case("abc")]
    #[case("12abc")]
    #[case("NaN")]
    #[case("inf")]
    fn non_numeric_value_is_rejected(#[case] value: &str) {
        let mut flows = FlowCollection::new();
        let mut draft = FlowDraft::new("A", "B", value);

        let err = draft.submit(&mut flows).unwrap_err();
        assert!(matches!(err, DraftError::InvalidValue(_)));
        assert!(flows.is_empty());
        assert_eq!(draft.value, value);
    }

    #[test]
    fn negative_value_is_rejected() {
        let draft = FlowDraft::new("A", "B", "-3");
        assert_eq!(draft.to_record(), Err(DraftError::NegativeValue(-3.0)));
    }

    #[rstest]
    #[case("0", 0.0)]
    #[case("20", 20.0)]
    #[case("2.25", 2.25)]
    #[case("1e3", 1000.0)]
    fn numeric_values_are_parsed(#[case] value: &str, #[case] expected: f64) {
        let record = FlowDraft::new("A", "B", value).to_record().unwrap();
        assert_eq!(record.value, expected);
    }
}
