//! Model defaults used wherever a job leaves a physics setting out.

use hy_job::ConfigMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsDefaults {
    pub config_mode: ConfigMode,
    pub max_particles: u64,
    pub vertical_motion_code: u8,
    pub top_of_model_m_agl: f64,
    pub sampling: SamplingInterval,
    pub deposition: DepositionDefaults,
}

impl Default for PhysicsDefaults {
    fn default() -> Self {
        Self {
            config_mode: ConfigMode::Particle,
            max_particles: 10_000,
            vertical_motion_code: 0,
            top_of_model_m_agl: 10_000.0,
            sampling: SamplingInterval::default(),
            deposition: DepositionDefaults::default(),
        }
    }
}

/// Concentration sampling: averaging type, then interval hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingInterval {
    pub kind: u8,
    pub hours: u32,
    pub minutes: u32,
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self {
            kind: 0,
            hours: 1,
            minutes: 0,
        }
    }
}

/// Per-pollutant deposition block; all zero is a non-depositing gas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DepositionDefaults {
    /// Diameter (um), density (g/cc), shape.
    pub particle: [f64; 3],
    /// Deposition velocity (m/s), molecular weight (g/mol), surface
    /// reactivity ratio, diffusivity ratio, effective Henry's constant.
    pub dry: [f64; 5],
    /// Henry's (M/atm), in-cloud (1/s), below-cloud (1/s).
    pub wet: [f64; 3],
    pub half_life_days: f64,
    pub resuspension_per_m: f64,
}

/// SETUP `initd` code for a particle/puff configuration.
pub fn initd_code(mode: ConfigMode) -> u8 {
    match mode {
        ConfigMode::Particle => 0,
        ConfigMode::Puff => 3,
    }
}
