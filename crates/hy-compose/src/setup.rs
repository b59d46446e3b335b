//! SETUP.CFG namelist composition.

use hy_job::{Job, ModeVariant};

use crate::defaults::{PhysicsDefaults, initd_code};
use crate::format::{join_lines, real};

pub const NAMELIST_OPEN: &str = " &SETUP";
pub const NAMELIST_CLOSE: &str = " /";

/// Ordered `key = value` entries of the namelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    entries: Vec<(&'static str, String)>,
}

impl SetupConfig {
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![NAMELIST_OPEN.to_string()];
        lines.extend(
            self.entries
                .iter()
                .map(|(k, v)| format!(" {} = {},", k, v)),
        );
        lines.push(NAMELIST_CLOSE.to_string());
        join_lines(&lines)
    }
}

pub fn compose_setup(job: &Job, defaults: &PhysicsDefaults) -> SetupConfig {
    let physics = job.physics();
    let mut entries = vec![
        (
            "initd",
            initd_code(physics.config_mode.unwrap_or(defaults.config_mode)).to_string(),
        ),
        (
            "maxpar",
            physics
                .max_particles
                .unwrap_or(defaults.max_particles)
                .to_string(),
        ),
        (
            "vmotion",
            physics
                .vertical_motion_code
                .unwrap_or(defaults.vertical_motion_code)
                .to_string(),
        ),
        (
            "ztop",
            real(
                physics
                    .top_of_model_m_agl
                    .unwrap_or(defaults.top_of_model_m_agl),
            ),
        ),
    ];

    if let ModeVariant::ConcentrationForward(c) = job.variant() {
        entries.push(("efile", format!("'{}'", c.emitimes_file_path)));
    }

    SetupConfig { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namelist_text_layout() {
        let setup = SetupConfig {
            entries: vec![("initd", "0".to_string()), ("maxpar", "500".to_string())],
        };
        assert_eq!(setup.to_text(), " &SETUP\n initd = 0,\n maxpar = 500,\n /\n");
        assert_eq!(setup.get("maxpar"), Some("500"));
        assert_eq!(setup.get("efile"), None);
    }

    #[test]
    fn forward_concentration_quotes_efile() {
        let def = hy_job::parse_json(include_str!("../../../demos/conc_forward.json")).unwrap();
        let job = hy_job::validate_job(&def).unwrap();
        let setup = compose_setup(&job, &PhysicsDefaults::default());
        assert_eq!(setup.get("efile"), Some("'./EMITIMES'"));
        assert_eq!(setup.entries().last().map(|(k, _)| *k), Some("efile"));
    }
}
