//! Semantic tags that can be attached to a table column.

use serde::{Deserialize, Serialize};

/// Meaning of the data found in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    LastName,
    FirstName,
    Occupation,
    PlaceOfBirth,
    DateOfBirth,
    DateOfDeath,
    DateOfEnteringCamp,
    DateOfLeavingCamp,
    DateOfRescue,
    PrisonerNumber,
    OldPrisonerNumber,
    RunningNumber,
    ConcentrationCamp,
    Nationality,
    Religion,
    ImprisonmentReason,
    PlaceOfResidence,
    DateOfEscape,
    DateOfRecapture,
}

impl ColumnType {
    /// Get the display label for this column type.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::LastName => "last name",
            ColumnType::FirstName => "first name",
            ColumnType::Occupation => "occupation",
            ColumnType::PlaceOfBirth => "place of birth",
            ColumnType::DateOfBirth => "date of birth",
            ColumnType::DateOfDeath => "date of death",
            ColumnType::DateOfEnteringCamp => "date of entering camp",
            ColumnType::DateOfLeavingCamp => "date of leaving camp",
            ColumnType::DateOfRescue => "date of rescue",
            ColumnType::PrisonerNumber => "prisoner number",
            ColumnType::OldPrisonerNumber => "old prisoner number",
            ColumnType::RunningNumber => "running number",
            ColumnType::ConcentrationCamp => "concentration camp",
            ColumnType::Nationality => "nationality",
            ColumnType::Religion => "religion",
            ColumnType::ImprisonmentReason => "imprisonment reason",
            ColumnType::PlaceOfResidence => "place of residence",
            ColumnType::DateOfEscape => "date of escape",
            ColumnType::DateOfRecapture => "date of recapture",
        }
    }

    /// Get all column types in menu order.
    pub fn all() -> &'static [ColumnType] {
        &[
            ColumnType::LastName,
            ColumnType::FirstName,
            ColumnType::Occupation,
            ColumnType::PlaceOfBirth,
            ColumnType::DateOfBirth,
            ColumnType::DateOfDeath,
            ColumnType::DateOfEnteringCamp,
            ColumnType::DateOfLeavingCamp,
            ColumnType::DateOfRescue,
            ColumnType::PrisonerNumber,
            ColumnType::OldPrisonerNumber,
            ColumnType::RunningNumber,
            ColumnType::ConcentrationCamp,
            ColumnType::Nationality,
            ColumnType::Religion,
            ColumnType::ImprisonmentReason,
            ColumnType::PlaceOfResidence,
            ColumnType::DateOfEscape,
            ColumnType::DateOfRecapture,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_as_screaming_snake_case() {
        let json = serde_json::to_string(&ColumnType::DateOfEnteringCamp).expect("serialize");
        assert_eq!(json, "\"DATE_OF_ENTERING_CAMP\"");
        let back: ColumnType = serde_json::from_str("\"LAST_NAME\"").expect("deserialize");
        assert_eq!(back, ColumnType::LastName);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = ColumnType::all().iter().map(|t| t.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ColumnType::all().len());
    }
}
