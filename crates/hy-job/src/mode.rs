//! Simulation mode resolution and the per-mode field matrix.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MODEL_CONCENTRATION: &str = "CONCENTRATION";
pub const MODEL_TRAJECTORY: &str = "TRAJECTORY";
pub const DIRECTION_FORWARD: &str = "FORWARD";
pub const DIRECTION_BACKWARD: &str = "BACKWARD";

/// The four supported `(modelType, direction)` combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    ConcFwd,
    ConcBwd,
    TrajFwd,
    TrajBwd,
}

/// Job fields whose presence depends on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeField {
    PollutantMatrixConfig,
    ConcentrationGrids,
    EmissionScenarios,
    EmitimesFilePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Forbidden,
}

impl ModeField {
    pub const ALL: [ModeField; 4] = [
        ModeField::PollutantMatrixConfig,
        ModeField::ConcentrationGrids,
        ModeField::EmissionScenarios,
        ModeField::EmitimesFilePath,
    ];

    /// Path of the field in the job payload.
    pub fn path(self) -> &'static str {
        match self {
            ModeField::PollutantMatrixConfig => "pollutantMatrixConfig",
            ModeField::ConcentrationGrids => "concentrationGrids",
            ModeField::EmissionScenarios => "emissionScenarios",
            ModeField::EmitimesFilePath => "physicsConfig.emitimesFilePath",
        }
    }
}

impl fmt::Display for ModeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::ConcFwd, Mode::ConcBwd, Mode::TrajFwd, Mode::TrajBwd];

    /// Resolve the mode tag from the raw `simulationMeta` strings.
    pub fn resolve(model_type: &str, direction: &str) -> Result<Mode, ValidationError> {
        match (model_type, direction) {
            (MODEL_CONCENTRATION, DIRECTION_FORWARD) => Ok(Mode::ConcFwd),
            (MODEL_CONCENTRATION, DIRECTION_BACKWARD) => Ok(Mode::ConcBwd),
            (MODEL_TRAJECTORY, DIRECTION_FORWARD) => Ok(Mode::TrajFwd),
            (MODEL_TRAJECTORY, DIRECTION_BACKWARD) => Ok(Mode::TrajBwd),
            _ => Err(ValidationError::UnsupportedMode {
                model_type: model_type.to_string(),
                direction: direction.to_string(),
            }),
        }
    }

    pub fn rule(self, field: ModeField) -> FieldRule {
        use FieldRule::{Forbidden, Required};
        match (self, field) {
            (Mode::ConcFwd, _) => Required,
            (Mode::ConcBwd, ModeField::PollutantMatrixConfig | ModeField::ConcentrationGrids) => {
                Required
            }
            (Mode::ConcBwd, _) => Forbidden,
            (Mode::TrajFwd | Mode::TrajBwd, _) => Forbidden,
        }
    }

    /// The full required/forbidden matrix row for this mode.
    pub fn rules(self) -> [(ModeField, FieldRule); 4] {
        ModeField::ALL.map(|field| (field, self.rule(field)))
    }

    pub fn is_concentration(self) -> bool {
        matches!(self, Mode::ConcFwd | Mode::ConcBwd)
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Mode::ConcFwd | Mode::TrajFwd)
    }

    /// +1 for forward runs, -1 for backward runs.
    pub fn direction_sign(self) -> i64 {
        if self.is_forward() { 1 } else { -1 }
    }

    pub fn direction_name(self) -> &'static str {
        if self.is_forward() {
            DIRECTION_FORWARD
        } else {
            DIRECTION_BACKWARD
        }
    }

    /// Forward runs end after they start; backward runs end before.
    pub fn epochs_ordered(self, start: i64, end: i64) -> bool {
        if self.is_forward() {
            end >= start
        } else {
            end <= start
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::ConcFwd => "ConcFwd",
            Mode::ConcBwd => "ConcBwd",
            Mode::TrajFwd => "TrajFwd",
            Mode::TrajBwd => "TrajBwd",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FieldRule::{Forbidden, Required};

    #[test]
    fn resolves_all_four_modes() {
        assert_eq!(Mode::resolve("CONCENTRATION", "FORWARD"), Ok(Mode::ConcFwd));
        assert_eq!(Mode::resolve("CONCENTRATION", "BACKWARD"), Ok(Mode::ConcBwd));
        assert_eq!(Mode::resolve("TRAJECTORY", "FORWARD"), Ok(Mode::TrajFwd));
        assert_eq!(Mode::resolve("TRAJECTORY", "BACKWARD"), Ok(Mode::TrajBwd));
    }

    #[test]
    fn unknown_pairs_are_unsupported() {
        for (model, dir) in [
            ("CONCENTRATION", "SIDEWAYS"),
            ("DEPOSITION", "FORWARD"),
            ("concentration", "forward"),
            ("", ""),
        ] {
            assert_eq!(
                Mode::resolve(model, dir),
                Err(ValidationError::UnsupportedMode {
                    model_type: model.to_string(),
                    direction: dir.to_string(),
                })
            );
        }
    }

    #[test]
    fn matrix_matches_mode_table() {
        assert_eq!(
            Mode::ConcFwd.rules().map(|(_, r)| r),
            [Required, Required, Required, Required]
        );
        assert_eq!(
            Mode::ConcBwd.rules().map(|(_, r)| r),
            [Required, Required, Forbidden, Forbidden]
        );
        for mode in [Mode::TrajFwd, Mode::TrajBwd] {
            assert_eq!(
                mode.rules().map(|(_, r)| r),
                [Forbidden, Forbidden, Forbidden, Forbidden]
            );
        }
    }

    #[test]
    fn epoch_ordering_by_direction() {
        assert!(Mode::ConcFwd.epochs_ordered(10, 20));
        assert!(Mode::TrajFwd.epochs_ordered(10, 10));
        assert!(!Mode::TrajFwd.epochs_ordered(20, 10));
        assert!(Mode::ConcBwd.epochs_ordered(20, 10));
        assert!(!Mode::TrajBwd.epochs_ordered(10, 20));
    }

    #[test]
    fn direction_sign() {
        assert_eq!(Mode::ConcFwd.direction_sign(), 1);
        assert_eq!(Mode::TrajBwd.direction_sign(), -1);
    }
}
