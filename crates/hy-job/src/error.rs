//! Validation error kinds and the aggregated report.

use core::fmt;

use hy_core::PointId;

use crate::mode::{Mode, ModeField};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported mode: modelType '{model_type}' with direction '{direction}'")]
    UnsupportedMode {
        model_type: String,
        direction: String,
    },

    #[error("Missing required field {field} for mode {mode}")]
    MissingRequiredField { field: ModeField, mode: Mode },

    #[error("Field {field} must be omitted for mode {mode}")]
    ForbiddenFieldPresent { field: ModeField, mode: Mode },

    #[error("Unknown unit '{unit_id}' referenced by {context}")]
    UnknownUnit { unit_id: String, context: String },

    #[error("Unknown point {point_id} referenced by {context}")]
    UnknownPoint { point_id: PointId, context: String },

    #[error("Unknown pollutant '{pollutant_id}' referenced by {context}")]
    UnknownPollutant {
        pollutant_id: String,
        context: String,
    },

    #[error(
        "Unit '{unit_id}' custom zone {index} has upper {upper}, not above the previous {previous}"
    )]
    InvalidZoneOrdering {
        unit_id: String,
        index: usize,
        previous: f64,
        upper: f64,
    },

    #[error("Unit '{unit_id}' uses unsupported conversion strategy '{strategy}'")]
    UnsupportedConversion { unit_id: String, strategy: String },

    #[error(
        "Emission cycle {cycle} [{start}, {end}) is missing records for {}",
        format_pairs(.missing)
    )]
    IncompleteEmissionCycle {
        cycle: usize,
        start: i64,
        end: i64,
        missing: Vec<(PointId, String)>,
    },

    #[error("Epoch ordering violated for {direction} run: start {start}, end {end}")]
    EpochOrdering {
        direction: String,
        start: i64,
        end: i64,
    },

    #[error(
        "Emission intervals [{first_start}, {first_end}) and [{second_start}, {second_end}) partially overlap"
    )]
    OverlappingEmissionCycles {
        first_start: i64,
        first_end: i64,
        second_start: i64,
        second_end: i64,
    },

    #[error(
        "Emission cycle {cycle} has more than one record for point {point_id} / pollutant '{pollutant_id}'"
    )]
    DuplicateEmission {
        cycle: usize,
        point_id: PointId,
        pollutant_id: String,
    },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Key '{key}' in {context} does not match its id '{id}'")]
    KeyMismatch {
        key: String,
        id: String,
        context: String,
    },

    #[error("Pollutants '{first}' and '{second}' share the CONTROL identification '{code}'")]
    PollutantCodeCollision {
        code: String,
        first: String,
        second: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn format_pairs(pairs: &[(PointId, String)]) -> String {
    pairs
        .iter()
        .map(|(p, pol)| format!("({}, {})", p, pol))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every semantic error found in one job. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub(crate) fn from_nonempty(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_every_error() {
        let report = ValidationReport::from_nonempty(vec![
            ValidationError::UnknownPollutant {
                pollutant_id: "co2".to_string(),
                context: "emissionScenarios[0]".to_string(),
            },
            ValidationError::invalid("points[0].latitude", 91.0, "must be in [-90, 90]"),
        ]);

        let text = report.to_string();
        assert!(text.starts_with("2 validation error(s)"));
        assert!(text.contains("'co2'"));
        assert!(text.contains("points[0].latitude = 91"));
    }

    #[test]
    fn incomplete_cycle_names_missing_pairs() {
        let err = ValidationError::IncompleteEmissionCycle {
            cycle: 1,
            start: 10,
            end: 20,
            missing: vec![(PointId(14), "nox".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "Emission cycle 1 [10, 20) is missing records for (14, nox)"
        );
    }
}
