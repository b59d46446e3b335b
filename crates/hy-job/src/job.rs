//! Validated job model.
//!
//! A [`Job`] only comes out of [`crate::validate_job`]; its fields are
//! read-only from the outside. Mode-dependent sections live in the closed
//! [`ModeVariant`] so a trajectory job cannot carry concentration data.

use crate::emissions::EmissionCycle;
use crate::mode::Mode;
use crate::schema::{
    ConfigMode, CustomZonesDef, FileRefDef, GridDef, PlotConfigDef, PointDef, PollutantDef,
};
use crate::units::UnitRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub(crate) job_id: Option<String>,
    pub(crate) meta: SimulationMeta,
    pub(crate) met_files: Vec<FileRefDef>,
    pub(crate) physics: PhysicsConfig,
    pub(crate) points: Vec<PointDef>,
    pub(crate) units: UnitRegistry,
    pub(crate) variant: ModeVariant,
    pub(crate) plot: Option<PlotConfigDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationMeta {
    pub mode: Mode,
    pub start_epoch_utc: i64,
    pub end_epoch_utc: i64,
    pub output_file: FileRefDef,
}

/// Physics settings as given; absent keys stay `None` so the composer
/// can fall back to model defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhysicsConfig {
    pub config_mode: Option<ConfigMode>,
    pub max_particles: Option<u64>,
    pub vertical_motion_code: Option<u8>,
    pub top_of_model_m_agl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationForward {
    pub pollutants: Vec<PollutantDef>,
    pub grids: Vec<GridDef>,
    pub cycles: Vec<EmissionCycle>,
    pub emitimes_file_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationBackward {
    pub pollutants: Vec<PollutantDef>,
    pub grids: Vec<GridDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeVariant {
    ConcentrationForward(ConcentrationForward),
    ConcentrationBackward(ConcentrationBackward),
    TrajectoryForward,
    TrajectoryBackward,
}

impl ModeVariant {
    pub fn mode(&self) -> Mode {
        match self {
            ModeVariant::ConcentrationForward(_) => Mode::ConcFwd,
            ModeVariant::ConcentrationBackward(_) => Mode::ConcBwd,
            ModeVariant::TrajectoryForward => Mode::TrajFwd,
            ModeVariant::TrajectoryBackward => Mode::TrajBwd,
        }
    }

    /// Pollutants and grids shared by both concentration modes.
    pub fn concentration(&self) -> Option<(&[PollutantDef], &[GridDef])> {
        match self {
            ModeVariant::ConcentrationForward(c) => Some((&c.pollutants, &c.grids)),
            ModeVariant::ConcentrationBackward(c) => Some((&c.pollutants, &c.grids)),
            ModeVariant::TrajectoryForward | ModeVariant::TrajectoryBackward => None,
        }
    }
}

impl Job {
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.meta.mode
    }

    pub fn meta(&self) -> &SimulationMeta {
        &self.meta
    }

    pub fn met_files(&self) -> &[FileRefDef] {
        &self.met_files
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn points(&self) -> &[PointDef] {
        &self.points
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn variant(&self) -> &ModeVariant {
        &self.variant
    }

    pub fn plot(&self) -> Option<&PlotConfigDef> {
        self.plot.as_ref()
    }

    /// Display zones of the plotted pollutant's unit.
    pub fn plot_zones(&self) -> Option<&CustomZonesDef> {
        let plot = self.plot.as_ref()?;
        let (pollutants, _) = self.variant.concentration()?;
        let pollutant = pollutants
            .iter()
            .find(|p| p.pollutant_id == plot.pollutant_id)?;
        self.units.zones(&pollutant.unit_id).ok().flatten()
    }
}
