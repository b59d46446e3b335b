//! Job description schema definitions.
//!
//! These types mirror the submitted job payload. Deserialization failures
//! (missing required keys, wrong types) are structural and fatal; every
//! semantic rule lives in [`crate::validate`].

use hy_core::PointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub simulation_meta: SimulationMetaDef,
    pub met_files: Vec<FileRefDef>,
    #[serde(default)]
    pub physics_config: PhysicsConfigDef,
    pub points: Vec<PointDef>,
    #[serde(default)]
    pub units: BTreeMap<String, UnitDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollutant_matrix_config: Option<BTreeMap<String, PollutantDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_grids: Option<Vec<GridDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_scenarios: Option<Vec<EmissionScenarioDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_config: Option<PlotConfigDef>,
}

/// `modelType` and `direction` stay plain strings here so that an
/// unrecognised pair surfaces as an unsupported mode rather than a parse
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetaDef {
    pub model_type: String,
    pub direction: String,
    #[serde(rename = "startEpochUTC")]
    pub start_epoch_utc: i64,
    #[serde(rename = "endEpochUTC")]
    pub end_epoch_utc: i64,
    pub output_file: FileRefDef,
}

/// Directory + file name pair (met files, output file, plot file).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FileRefDef {
    pub directory: String,
    pub file_name: String,
}

impl FileRefDef {
    pub fn new(directory: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigMode {
    Particle,
    Puff,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsConfigDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_mode: Option<ConfigMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_particles: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_motion_code: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitimes_file_path: Option<String>,
    #[serde(
        rename = "topOfModelMAgl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub top_of_model_m_agl: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PointDef {
    pub point_id: PointId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "heightMAgl")]
    pub height_m_agl: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDef {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conversion_strategy: ConversionStrategyDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_zones: Option<CustomZonesDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionStrategyDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

/// Display bands of a unit: `lower` bound then ascending upper edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomZonesDef {
    #[serde(default)]
    pub lower: f64,
    #[serde(default)]
    pub next: Vec<ZoneDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub upper: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverted_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollutantDef {
    pub pollutant_id: String,
    #[serde(rename = "initialMassG")]
    pub initial_mass_g: f64,
    pub unit_id: String,
}

/// Longest pollutant identification the CONTROL file carries.
pub const POLLUTANT_CODE_LEN: usize = 4;

/// CONTROL pollutant identification: upper case, at most four characters.
pub fn pollutant_code(pollutant_id: &str) -> String {
    pollutant_id
        .to_uppercase()
        .chars()
        .take(POLLUTANT_CODE_LEN)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridDef {
    pub center_lat: f64,
    pub center_lon: f64,
    pub spacing_lat: f64,
    pub spacing_lon: f64,
    pub span_lat: u32,
    pub span_lon: u32,
    #[serde(rename = "outputLevelsMAgl")]
    pub output_levels_m_agl: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmissionScenarioDef {
    pub point_id: PointId,
    pub pollutant_id: String,
    #[serde(rename = "releaseStartEpochUTC")]
    pub release_start_epoch_utc: i64,
    #[serde(rename = "releaseEndEpochUTC")]
    pub release_end_epoch_utc: i64,
    pub rate: QuantityDef,
    pub area: QuantityDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuantityDef {
    pub value: f64,
    pub unit_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfigDef {
    pub pollutant_id: String,
    #[serde(rename = "plotLevelMAgl")]
    pub plot_level_m_agl: f64,
    pub output_plot_file: FileRefDef,
    #[serde(default)]
    pub contour_levels: Vec<ContourLevelDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContourLevelDef {
    pub value: f64,
    pub color_index: u32,
}
