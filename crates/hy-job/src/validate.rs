//! Job validation.
//!
//! Parsing has already succeeded by the time these checks run; everything
//! here is semantic and accumulates into one [`ValidationReport`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Component, Path};

use tracing::{debug, warn};

use crate::emissions::EmissionMatrixBuilder;
use crate::error::{ValidationError, ValidationReport};
use crate::job::{
    ConcentrationBackward, ConcentrationForward, Job, ModeVariant, PhysicsConfig, SimulationMeta,
};
use crate::mode::{FieldRule, Mode, ModeField};
use crate::refs::ReferenceResolver;
use crate::schema::{
    EmissionScenarioDef, FileRefDef, GridDef, JobDef, PhysicsConfigDef, PlotConfigDef, PointDef,
    PollutantDef, pollutant_code,
};
use crate::units::UnitRegistry;

/// Highest vertical motion option understood by the model.
pub const MAX_VERTICAL_MOTION_CODE: u8 = 8;

pub fn validate_job(def: &JobDef) -> Result<Job, ValidationReport> {
    let span = tracing::debug_span!("validate_job", job_id = def.job_id.as_deref().unwrap_or("-"));
    let _guard = span.enter();

    let mut errors = Vec::new();

    let meta = &def.simulation_meta;
    let mode = match Mode::resolve(&meta.model_type, &meta.direction) {
        Ok(mode) => {
            debug!(%mode, "resolved simulation mode");
            check_mode_fields(def, mode, &mut errors);
            Some(mode)
        }
        Err(err) => {
            errors.push(err);
            None
        }
    };

    calendar_epoch("simulationMeta.startEpochUTC", meta.start_epoch_utc, &mut errors);
    calendar_epoch("simulationMeta.endEpochUTC", meta.end_epoch_utc, &mut errors);
    check_output_file(&meta.output_file, &mut errors);
    check_met_files(&def.met_files, &mut errors);
    check_physics(&def.physics_config, &mut errors);
    check_points(&def.points, &mut errors);
    if let Some(pollutants) = &def.pollutant_matrix_config {
        check_pollutant_values(pollutants, &mut errors);
        check_pollutant_codes(pollutants, &mut errors);
    }
    if let Some(grids) = &def.concentration_grids {
        check_grids(grids, &mut errors);
    }
    if let Some(scenarios) = &def.emission_scenarios {
        check_scenario_values(scenarios, &mut errors);
    }
    if let Some(plot) = &def.plot_config {
        check_plot_values(plot, &mut errors);
    }

    let units = UnitRegistry::from_defs(&def.units);
    errors.extend(UnitRegistry::check(&def.units));
    check_references(def, &ReferenceResolver::new(def, &units), &mut errors);

    if mode == Some(Mode::ConcFwd) {
        if let (Some(pollutants), Some(scenarios)) =
            (&def.pollutant_matrix_config, &def.emission_scenarios)
        {
            let builder = EmissionMatrixBuilder::new(&def.points, pollutants.values());
            errors.extend(builder.check(scenarios));
        }
    }

    if let Some(mode) = mode {
        if !mode.epochs_ordered(meta.start_epoch_utc, meta.end_epoch_utc) {
            errors.push(ValidationError::EpochOrdering {
                direction: mode.direction_name().to_string(),
                start: meta.start_epoch_utc,
                end: meta.end_epoch_utc,
            });
        }
    }

    let mode = match mode {
        Some(mode) if errors.is_empty() => mode,
        _ => return Err(reject(errors)),
    };

    build_job(def, mode, units).map_err(reject)
}

fn reject(errors: Vec<ValidationError>) -> ValidationReport {
    warn!(count = errors.len(), "job rejected");
    ValidationReport::from_nonempty(errors)
}

/// A mode-gated collection counts as present only when non-empty.
pub fn field_present(def: &JobDef, field: ModeField) -> bool {
    match field {
        ModeField::PollutantMatrixConfig => def
            .pollutant_matrix_config
            .as_ref()
            .is_some_and(|m| !m.is_empty()),
        ModeField::ConcentrationGrids => def
            .concentration_grids
            .as_ref()
            .is_some_and(|g| !g.is_empty()),
        ModeField::EmissionScenarios => def
            .emission_scenarios
            .as_ref()
            .is_some_and(|s| !s.is_empty()),
        ModeField::EmitimesFilePath => def
            .physics_config
            .emitimes_file_path
            .as_ref()
            .is_some_and(|p| !p.trim().is_empty()),
    }
}

fn check_mode_fields(def: &JobDef, mode: Mode, errors: &mut Vec<ValidationError>) {
    for (field, rule) in mode.rules() {
        match (rule, field_present(def, field)) {
            (FieldRule::Required, false) => {
                errors.push(ValidationError::MissingRequiredField { field, mode })
            }
            (FieldRule::Forbidden, true) => {
                errors.push(ValidationError::ForbiddenFieldPresent { field, mode })
            }
            _ => {}
        }
    }
}

fn check_output_file(output: &FileRefDef, errors: &mut Vec<ValidationError>) {
    if output.directory.trim().is_empty() {
        errors.push(ValidationError::invalid(
            "simulationMeta.outputFile.directory",
            "\"\"",
            "must not be empty",
        ));
    }
    if output.file_name.trim().is_empty() {
        errors.push(ValidationError::invalid(
            "simulationMeta.outputFile.fileName",
            "\"\"",
            "must not be empty",
        ));
    }
}

fn check_met_files(met_files: &[FileRefDef], errors: &mut Vec<ValidationError>) {
    if met_files.is_empty() {
        errors.push(ValidationError::invalid(
            "metFiles",
            "[]",
            "at least one meteorological file is required",
        ));
    }
    for (i, met) in met_files.iter().enumerate() {
        if met.file_name.trim().is_empty() {
            errors.push(ValidationError::invalid(
                format!("metFiles[{}].fileName", i),
                "\"\"",
                "must not be empty",
            ));
        }
    }
}

fn check_physics(physics: &PhysicsConfigDef, errors: &mut Vec<ValidationError>) {
    if physics.max_particles == Some(0) {
        errors.push(ValidationError::invalid(
            "physicsConfig.maxParticles",
            0,
            "must be positive",
        ));
    }
    if let Some(code) = physics.vertical_motion_code.filter(|c| *c > MAX_VERTICAL_MOTION_CODE) {
        errors.push(ValidationError::invalid(
            "physicsConfig.verticalMotionCode",
            code,
            format!("must be in [0, {}]", MAX_VERTICAL_MOTION_CODE),
        ));
    }
    if let Some(top) = physics.top_of_model_m_agl {
        positive_finite("physicsConfig.topOfModelMAgl".to_string(), top, errors);
    }
    if let Some(path) = &physics.emitimes_file_path {
        if !stays_inside(path) {
            errors.push(ValidationError::invalid(
                "physicsConfig.emitimesFilePath",
                path,
                "must be a relative path inside the output directory",
            ));
        }
    }
}

/// Relative, with no `..` or root components.
fn stays_inside(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn check_points(points: &[PointDef], errors: &mut Vec<ValidationError>) {
    if points.is_empty() {
        errors.push(ValidationError::invalid(
            "points",
            "[]",
            "at least one point is required",
        ));
    }

    let mut seen = HashSet::new();
    for (i, point) in points.iter().enumerate() {
        if !seen.insert(point.point_id) {
            errors.push(ValidationError::DuplicateId {
                id: point.point_id.to_string(),
                context: "points".to_string(),
            });
        }
        latitude(format!("points[{}].latitude", i), point.latitude, errors);
        longitude(format!("points[{}].longitude", i), point.longitude, errors);
        non_negative_finite(format!("points[{}].heightMAgl", i), point.height_m_agl, errors);
    }
}

fn check_pollutant_values(
    pollutants: &BTreeMap<String, PollutantDef>,
    errors: &mut Vec<ValidationError>,
) {
    for (key, pollutant) in pollutants {
        if pollutant.pollutant_id != *key {
            errors.push(ValidationError::KeyMismatch {
                key: key.clone(),
                id: pollutant.pollutant_id.clone(),
                context: "pollutantMatrixConfig".to_string(),
            });
        }
        non_negative_finite(
            format!("pollutantMatrixConfig.{}.initialMassG", key),
            pollutant.initial_mass_g,
            errors,
        );
    }
}

/// Distinct pollutants must stay distinct once cut down to CONTROL codes.
fn check_pollutant_codes(
    pollutants: &BTreeMap<String, PollutantDef>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for key in pollutants.keys() {
        let code = pollutant_code(key);
        match seen.get(code.as_str()) {
            Some(first) => errors.push(ValidationError::PollutantCodeCollision {
                code,
                first: first.to_string(),
                second: key.clone(),
            }),
            None => {
                seen.insert(code, key);
            }
        }
    }
}

fn check_grids(grids: &[GridDef], errors: &mut Vec<ValidationError>) {
    for (i, grid) in grids.iter().enumerate() {
        let field = |name: &str| format!("concentrationGrids[{}].{}", i, name);
        latitude(field("centerLat"), grid.center_lat, errors);
        longitude(field("centerLon"), grid.center_lon, errors);
        positive_finite(field("spacingLat"), grid.spacing_lat, errors);
        positive_finite(field("spacingLon"), grid.spacing_lon, errors);
        if grid.span_lat == 0 {
            errors.push(ValidationError::invalid(field("spanLat"), 0, "must be positive"));
        }
        if grid.span_lon == 0 {
            errors.push(ValidationError::invalid(field("spanLon"), 0, "must be positive"));
        }

        let levels = &grid.output_levels_m_agl;
        if levels.is_empty() {
            errors.push(ValidationError::invalid(
                field("outputLevelsMAgl"),
                "[]",
                "at least one output level is required",
            ));
        }
        for (j, level) in levels.iter().enumerate() {
            non_negative_finite(field(&format!("outputLevelsMAgl[{}]", j)), *level, errors);
        }
        if let Some(j) = hy_core::first_non_increasing(levels) {
            errors.push(ValidationError::invalid(
                field(&format!("outputLevelsMAgl[{}]", j)),
                levels[j],
                "levels must be strictly increasing",
            ));
        }
    }
}

fn check_scenario_values(scenarios: &[EmissionScenarioDef], errors: &mut Vec<ValidationError>) {
    for (i, scenario) in scenarios.iter().enumerate() {
        if scenario.release_start_epoch_utc >= scenario.release_end_epoch_utc {
            errors.push(ValidationError::invalid(
                format!("emissionScenarios[{}].releaseEndEpochUTC", i),
                scenario.release_end_epoch_utc,
                format!(
                    "must be after releaseStartEpochUTC {}",
                    scenario.release_start_epoch_utc
                ),
            ));
        }
        calendar_epoch(
            &format!("emissionScenarios[{}].releaseStartEpochUTC", i),
            scenario.release_start_epoch_utc,
            errors,
        );
        calendar_epoch(
            &format!("emissionScenarios[{}].releaseEndEpochUTC", i),
            scenario.release_end_epoch_utc,
            errors,
        );
        non_negative_finite(
            format!("emissionScenarios[{}].rate.value", i),
            scenario.rate.value,
            errors,
        );
        non_negative_finite(
            format!("emissionScenarios[{}].area.value", i),
            scenario.area.value,
            errors,
        );
    }
}

fn check_plot_values(plot: &PlotConfigDef, errors: &mut Vec<ValidationError>) {
    non_negative_finite(
        "plotConfig.plotLevelMAgl".to_string(),
        plot.plot_level_m_agl,
        errors,
    );
    for (i, level) in plot.contour_levels.iter().enumerate() {
        if !level.value.is_finite() {
            errors.push(ValidationError::invalid(
                format!("plotConfig.contourLevels[{}].value", i),
                level.value,
                "must be finite",
            ));
        }
    }
}

fn check_references(
    def: &JobDef,
    refs: &ReferenceResolver<'_>,
    errors: &mut Vec<ValidationError>,
) {
    let mut push = |result: Result<(), ValidationError>| {
        if let Err(err) = result {
            errors.push(err);
        }
    };

    if let Some(pollutants) = &def.pollutant_matrix_config {
        for (key, pollutant) in pollutants {
            push(refs.require_unit(
                &pollutant.unit_id,
                &format!("pollutantMatrixConfig.{}.unitId", key),
            ));
        }
    }

    if let Some(scenarios) = &def.emission_scenarios {
        for (i, scenario) in scenarios.iter().enumerate() {
            let at = |name: &str| format!("emissionScenarios[{}].{}", i, name);
            push(refs.require_point(scenario.point_id, &at("pointId")));
            push(refs.require_pollutant(&scenario.pollutant_id, &at("pollutantId")));
            push(refs.require_unit(&scenario.rate.unit_id, &at("rate.unitId")));
            push(refs.require_unit(&scenario.area.unit_id, &at("area.unitId")));
        }
    }

    if let Some(plot) = &def.plot_config {
        push(refs.require_pollutant(&plot.pollutant_id, "plotConfig.pollutantId"));
    }
}

fn build_job(def: &JobDef, mode: Mode, units: UnitRegistry) -> Result<Job, Vec<ValidationError>> {
    let pollutants: Vec<PollutantDef> = def
        .pollutant_matrix_config
        .as_ref()
        .map(|m| m.values().cloned().collect())
        .unwrap_or_default();
    let grids = def.concentration_grids.clone().unwrap_or_default();

    let variant = match mode {
        Mode::ConcFwd => {
            let scenarios = def.emission_scenarios.as_deref().unwrap_or_default();
            let cycles = EmissionMatrixBuilder::new(&def.points, &pollutants).build(scenarios, &units)?;
            debug!(cycles = cycles.len(), "emission matrix complete");
            ModeVariant::ConcentrationForward(ConcentrationForward {
                pollutants,
                grids,
                cycles,
                emitimes_file_path: def
                    .physics_config
                    .emitimes_file_path
                    .clone()
                    .unwrap_or_default(),
            })
        }
        Mode::ConcBwd => {
            ModeVariant::ConcentrationBackward(ConcentrationBackward { pollutants, grids })
        }
        Mode::TrajFwd => ModeVariant::TrajectoryForward,
        Mode::TrajBwd => ModeVariant::TrajectoryBackward,
    };

    let meta = &def.simulation_meta;
    let physics = &def.physics_config;
    Ok(Job {
        job_id: def.job_id.clone(),
        meta: SimulationMeta {
            mode,
            start_epoch_utc: meta.start_epoch_utc,
            end_epoch_utc: meta.end_epoch_utc,
            output_file: meta.output_file.clone(),
        },
        met_files: def.met_files.clone(),
        physics: PhysicsConfig {
            config_mode: physics.config_mode,
            max_particles: physics.max_particles,
            vertical_motion_code: physics.vertical_motion_code,
            top_of_model_m_agl: physics.top_of_model_m_agl,
        },
        points: def.points.clone(),
        units,
        variant,
        plot: def.plot_config.clone(),
    })
}

/// Epochs must map onto a calendar date for the text artifacts.
fn calendar_epoch(field: &str, epoch: i64, errors: &mut Vec<ValidationError>) {
    if let Err(err) = hy_core::CalendarTime::from_epoch(epoch) {
        errors.push(ValidationError::invalid(field, epoch, err.to_string()));
    }
}

fn latitude(field: String, value: f64, errors: &mut Vec<ValidationError>) {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        errors.push(ValidationError::invalid(field, value, "must be in [-90, 90]"));
    }
}

fn longitude(field: String, value: f64, errors: &mut Vec<ValidationError>) {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        errors.push(ValidationError::invalid(field, value, "must be in [-180, 180]"));
    }
}

fn positive_finite(field: String, value: f64, errors: &mut Vec<ValidationError>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ValidationError::invalid(field, value, "must be positive and finite"));
    }
}

fn non_negative_finite(field: String, value: f64, errors: &mut Vec<ValidationError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ValidationError::invalid(
            field,
            value,
            "must be non-negative and finite",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{conc_fwd, to_def};
    use hy_core::PointId;
    use serde_json::json;

    fn errors_of(value: serde_json::Value) -> Vec<ValidationError> {
        validate_job(&to_def(value))
            .expect_err("job should be rejected")
            .into_errors()
    }

    #[test]
    fn reference_payload_validates() {
        let job = validate_job(&to_def(conc_fwd())).unwrap();
        assert_eq!(job.mode(), Mode::ConcFwd);
        match job.variant() {
            ModeVariant::ConcentrationForward(c) => {
                assert_eq!(c.cycles.len(), 1);
                assert_eq!(c.cycles[0].records.len(), 4);
                assert_eq!(c.emitimes_file_path, "./EMITIMES");
                // rate 500 in u1 (m = 0.5)
                let sox_10 = &c.cycles[0].records[1];
                assert_eq!((sox_10.point_id, sox_10.pollutant_id.as_str()), (PointId(10), "sox"));
                assert_eq!(sox_10.rate, 250.0);
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn unsupported_mode_still_reports_other_errors() {
        let mut v = conc_fwd();
        v["simulationMeta"]["direction"] = json!("UPWARD");
        v["points"][0]["latitude"] = json!(95.0);
        let errors = errors_of(v);
        assert!(matches!(errors[0], ValidationError::UnsupportedMode { .. }));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidValue { field, .. } if field == "points[0].latitude"
        )));
    }

    #[test]
    fn conc_fwd_without_emitimes_is_missing_field() {
        let mut v = conc_fwd();
        v["physicsConfig"]
            .as_object_mut()
            .unwrap()
            .remove("emitimesFilePath");
        assert_eq!(
            errors_of(v),
            vec![ValidationError::MissingRequiredField {
                field: ModeField::EmitimesFilePath,
                mode: Mode::ConcFwd,
            }]
        );
    }

    #[test]
    fn errors_accumulate_across_steps() {
        let mut v = conc_fwd();
        v["simulationMeta"]["endEpochUTC"] = json!(1764540000);
        v["emissionScenarios"][0]["pollutantId"] = json!("co2");
        v["units"]["u1"]["custom_zones"]["next"][1]["upper"] = json!(0.5);
        let errors = errors_of(v);

        assert!(errors.iter().any(|e| matches!(e, ValidationError::EpochOrdering { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidZoneOrdering { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownPollutant { pollutant_id, .. } if pollutant_id == "co2"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::IncompleteEmissionCycle { missing, .. }
                if missing == &vec![(PointId(10), "sox".to_string())]
        )));
    }

    #[test]
    fn empty_collection_counts_as_absent() {
        let mut v = conc_fwd();
        v["concentrationGrids"] = json!([]);
        assert_eq!(
            errors_of(v),
            vec![ValidationError::MissingRequiredField {
                field: ModeField::ConcentrationGrids,
                mode: Mode::ConcFwd,
            }]
        );
    }

    #[test]
    fn duplicate_point_ids_rejected() {
        let mut v = conc_fwd();
        v["points"][1]["pointId"] = json!(10);
        let errors = errors_of(v);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateId { id, .. } if id == "10"
        )));
    }

    #[test]
    fn grid_levels_must_increase() {
        let mut v = conc_fwd();
        v["concentrationGrids"][0]["outputLevelsMAgl"] = json!([100.0, 10.0]);
        let errors = errors_of(v);
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidValue { field, .. }]
                if field == "concentrationGrids[0].outputLevelsMAgl[1]"
        ));
    }

    #[test]
    fn pollutant_key_must_match_id() {
        let mut v = conc_fwd();
        v["pollutantMatrixConfig"]["nox"]["pollutantId"] = json!("no2");
        let errors = errors_of(v);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::KeyMismatch { .. })));
    }

    #[test]
    fn vertical_motion_code_range() {
        let mut v = conc_fwd();
        v["physicsConfig"]["verticalMotionCode"] = json!(9);
        assert_eq!(errors_of(v).len(), 1);
    }

    #[test]
    fn release_end_must_be_a_calendar_date() {
        let mut v = conc_fwd();
        for scenario in v["emissionScenarios"].as_array_mut().unwrap() {
            scenario["releaseStartEpochUTC"] = json!(-3600);
            scenario["releaseEndEpochUTC"] = json!(i64::MAX);
        }
        let errors = errors_of(v);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| matches!(
            e,
            ValidationError::InvalidValue { field, .. } if field.ends_with("].releaseEndEpochUTC")
        )));
    }

    #[test]
    fn pollutant_codes_must_stay_distinct() {
        let mut v = conc_fwd();
        v["pollutantMatrixConfig"]["SOx"] = json!({
            "pollutantId": "SOx",
            "initialMassG": 1.0,
            "unitId": "u1"
        });
        let errors = errors_of(v);
        assert!(errors.contains(&ValidationError::PollutantCodeCollision {
            code: "SOX".to_string(),
            first: "SOx".to_string(),
            second: "sox".to_string(),
        }));
    }

    #[test]
    fn emitimes_path_stays_in_output_directory() {
        for path in ["/tmp/x", "../EMITIMES", "out/../../EMITIMES"] {
            let mut v = conc_fwd();
            v["physicsConfig"]["emitimesFilePath"] = json!(path);
            assert!(
                matches!(
                    errors_of(v).as_slice(),
                    [ValidationError::InvalidValue { field, .. }]
                        if field == "physicsConfig.emitimesFilePath"
                ),
                "{path}"
            );
        }

        let mut v = conc_fwd();
        v["physicsConfig"]["emitimesFilePath"] = json!("./emissions/EMITIMES");
        assert!(validate_job(&to_def(v)).is_ok());
    }

    #[test]
    fn plot_zones_follow_pollutant_unit() {
        let job = validate_job(&to_def(conc_fwd())).unwrap();
        let zones = job.plot_zones().unwrap();
        assert_eq!(zones.next.len(), 2);
    }
}
