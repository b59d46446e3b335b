//! Emission cycle grouping and completeness checks (forward concentration).
//!
//! Scenarios sharing an identical `[releaseStart, releaseEnd)` interval form
//! one cycle. Cycles keep first-seen order and are then stably ordered by
//! start time. Every cycle must carry exactly one record for each
//! (point, pollutant) pair; gaps are reported, never filled.

use std::collections::{HashMap, HashSet};

use hy_core::PointId;
use serde::Serialize;

use crate::error::ValidationError;
use crate::schema::{EmissionScenarioDef, PointDef, PollutantDef};
use crate::units::UnitRegistry;

/// Scenarios that share one release interval.
#[derive(Debug, Clone)]
pub struct CycleGroup<'s> {
    pub start: i64,
    pub end: i64,
    pub scenarios: Vec<&'s EmissionScenarioDef>,
}

/// One emission record with rate and area in model units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionRecord {
    pub point_id: PointId,
    pub pollutant_id: String,
    pub rate: f64,
    pub area_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionCycle {
    pub start_epoch_utc: i64,
    pub end_epoch_utc: i64,
    /// Point-major, pollutant-minor, matching the job's point and pollutant order.
    pub records: Vec<EmissionRecord>,
}

impl EmissionCycle {
    pub fn duration_s(&self) -> i64 {
        self.end_epoch_utc.saturating_sub(self.start_epoch_utc)
    }

    pub fn records_for<'a>(&'a self, pollutant_id: &'a str) -> impl Iterator<Item = &'a EmissionRecord> {
        self.records
            .iter()
            .filter(move |r| r.pollutant_id == pollutant_id)
    }
}

/// Group scenarios into cycles by exact interval equality.
///
/// Intervals that are empty or reversed are left out; they are reported
/// as invalid values by the validator.
pub fn group_cycles(scenarios: &[EmissionScenarioDef]) -> Vec<CycleGroup<'_>> {
    let mut slot: HashMap<(i64, i64), usize> = HashMap::new();
    let mut groups: Vec<CycleGroup<'_>> = Vec::new();

    for scenario in scenarios {
        let key = (scenario.release_start_epoch_utc, scenario.release_end_epoch_utc);
        if key.0 >= key.1 {
            continue;
        }
        let idx = *slot.entry(key).or_insert_with(|| {
            groups.push(CycleGroup {
                start: key.0,
                end: key.1,
                scenarios: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].scenarios.push(scenario);
    }

    groups.sort_by_key(|g| g.start);
    groups
}

/// Expected (point, pollutant) matrix for every cycle.
#[derive(Debug)]
pub struct EmissionMatrixBuilder<'a> {
    points: Vec<PointId>,
    pollutants: Vec<&'a str>,
}

impl<'a> EmissionMatrixBuilder<'a> {
    pub fn new<I>(points: &[PointDef], pollutants: I) -> Self
    where
        I: IntoIterator<Item = &'a PollutantDef>,
    {
        let mut seen = HashSet::new();
        let points = points
            .iter()
            .map(|p| p.point_id)
            .filter(|id| seen.insert(*id))
            .collect();
        Self {
            points,
            pollutants: pollutants
                .into_iter()
                .map(|p| p.pollutant_id.as_str())
                .collect(),
        }
    }

    pub fn expected_pairs(&self) -> impl Iterator<Item = (PointId, &'a str)> + '_ {
        self.points
            .iter()
            .flat_map(move |p| self.pollutants.iter().map(move |pol| (*p, *pol)))
    }

    /// Overlap, duplicate and completeness errors across all cycles.
    pub fn check(&self, scenarios: &[EmissionScenarioDef]) -> Vec<ValidationError> {
        let groups = group_cycles(scenarios);
        let mut errors = overlap_errors(&groups);

        for (cycle, group) in groups.iter().enumerate() {
            let mut present: HashSet<(PointId, &str)> = HashSet::new();
            for scenario in &group.scenarios {
                let pair = (scenario.point_id, scenario.pollutant_id.as_str());
                if !present.insert(pair) {
                    errors.push(ValidationError::DuplicateEmission {
                        cycle,
                        point_id: pair.0,
                        pollutant_id: pair.1.to_string(),
                    });
                }
            }

            let missing: Vec<(PointId, String)> = self
                .expected_pairs()
                .filter(|pair| !present.contains(pair))
                .map(|(p, pol)| (p, pol.to_string()))
                .collect();
            if !missing.is_empty() {
                errors.push(ValidationError::IncompleteEmissionCycle {
                    cycle,
                    start: group.start,
                    end: group.end,
                    missing,
                });
            }
        }

        errors
    }

    /// Check, then lay out each cycle's records in matrix order with
    /// values converted into model units.
    pub fn build(
        &self,
        scenarios: &[EmissionScenarioDef],
        units: &UnitRegistry,
    ) -> Result<Vec<EmissionCycle>, Vec<ValidationError>> {
        let errors = self.check(scenarios);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut cycles = Vec::new();
        let mut errors = Vec::new();
        for group in group_cycles(scenarios) {
            let by_pair: HashMap<(PointId, &str), &EmissionScenarioDef> = group
                .scenarios
                .iter()
                .map(|s| ((s.point_id, s.pollutant_id.as_str()), *s))
                .collect();

            let mut records = Vec::new();
            for pair in self.expected_pairs() {
                let Some(scenario) = by_pair.get(&pair) else {
                    continue;
                };
                let converted = units
                    .convert(scenario.rate.value, &scenario.rate.unit_id)
                    .and_then(|rate| {
                        units
                            .convert(scenario.area.value, &scenario.area.unit_id)
                            .map(|area| (rate, area))
                    });
                match converted {
                    Ok((rate, area_m2)) => records.push(EmissionRecord {
                        point_id: pair.0,
                        pollutant_id: pair.1.to_string(),
                        rate,
                        area_m2,
                    }),
                    Err(err) => errors.push(err),
                }
            }

            cycles.push(EmissionCycle {
                start_epoch_utc: group.start,
                end_epoch_utc: group.end,
                records,
            });
        }

        if errors.is_empty() {
            Ok(cycles)
        } else {
            Err(errors)
        }
    }
}

fn overlap_errors(groups: &[CycleGroup<'_>]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            if b.start >= a.end {
                break;
            }
            errors.push(ValidationError::OverlappingEmissionCycles {
                first_start: a.start,
                first_end: a.end,
                second_start: b.start,
                second_end: b.end,
            });
        }
    }
    errors
}
