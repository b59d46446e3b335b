//! O(1) existence checks for cross-references inside a job.

use std::collections::HashSet;

use hy_core::PointId;

use crate::error::ValidationError;
use crate::schema::JobDef;
use crate::units::UnitRegistry;

/// Read-only index over the defining collections of a job.
#[derive(Debug)]
pub struct ReferenceResolver<'a> {
    points: HashSet<PointId>,
    pollutants: HashSet<&'a str>,
    units: &'a UnitRegistry,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(job: &'a JobDef, units: &'a UnitRegistry) -> Self {
        let points = job.points.iter().map(|p| p.point_id).collect();
        let pollutants = job
            .pollutant_matrix_config
            .iter()
            .flat_map(|m| m.keys())
            .map(String::as_str)
            .collect();
        Self {
            points,
            pollutants,
            units,
        }
    }

    pub fn point_exists(&self, point_id: PointId) -> bool {
        self.points.contains(&point_id)
    }

    pub fn pollutant_exists(&self, pollutant_id: &str) -> bool {
        self.pollutants.contains(pollutant_id)
    }

    pub fn unit_exists(&self, unit_id: &str) -> bool {
        self.units.contains(unit_id)
    }

    pub fn require_point(&self, point_id: PointId, context: &str) -> Result<(), ValidationError> {
        if self.point_exists(point_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownPoint {
                point_id,
                context: context.to_string(),
            })
        }
    }

    pub fn require_pollutant(&self, pollutant_id: &str, context: &str) -> Result<(), ValidationError> {
        if self.pollutant_exists(pollutant_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownPollutant {
                pollutant_id: pollutant_id.to_string(),
                context: context.to_string(),
            })
        }
    }

    pub fn require_unit(&self, unit_id: &str, context: &str) -> Result<(), ValidationError> {
        if self.unit_exists(unit_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownUnit {
                unit_id: unit_id.to_string(),
                context: context.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{conc_fwd, to_def};

    #[test]
    fn lookups_against_job_collections() {
        let def = to_def(conc_fwd());
        let units = UnitRegistry::from_defs(&def.units);
        let refs = ReferenceResolver::new(&def, &units);

        assert!(refs.point_exists(PointId(10)));
        assert!(!refs.point_exists(PointId(11)));
        assert!(refs.pollutant_exists("nox"));
        assert!(!refs.pollutant_exists("co2"));
        assert!(refs.unit_exists("u1"));
        assert!(refs.unit_exists("m2"));
        assert!(!refs.unit_exists("ppm"));
    }

    #[test]
    fn require_names_the_missing_id() {
        let def = to_def(conc_fwd());
        let units = UnitRegistry::from_defs(&def.units);
        let refs = ReferenceResolver::new(&def, &units);

        assert_eq!(
            refs.require_pollutant("co2", "emissionScenarios[0].pollutantId"),
            Err(ValidationError::UnknownPollutant {
                pollutant_id: "co2".to_string(),
                context: "emissionScenarios[0].pollutantId".to_string(),
            })
        );
        assert!(matches!(
            refs.require_point(PointId(99), "x"),
            Err(ValidationError::UnknownPoint { point_id: PointId(99), .. })
        ));
    }
}
