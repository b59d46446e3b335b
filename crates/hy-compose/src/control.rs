//! CONTROL file composition.
//!
//! Line order is fixed; optional concentration sections are left out
//! entirely for trajectory runs rather than written blank.

use hy_core::{ZERO_STAMP, control_stamp, signed_run_hours};
use hy_job::{EmissionCycle, GridDef, Job, ModeVariant, PollutantDef};

use crate::defaults::PhysicsDefaults;
use crate::format::{join_lines, pollutant_code, real, reals};
use crate::ComposeResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile {
    lines: Vec<String>,
}

impl ControlFile {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        join_lines(&self.lines)
    }
}

/// Emission line values for one pollutant.
struct Release {
    rate: f64,
    hours: f64,
    start: String,
}

pub fn compose_control(job: &Job, defaults: &PhysicsDefaults) -> ComposeResult<ControlFile> {
    let meta = job.meta();
    let physics = job.physics();
    let mut lines = Vec::new();

    let start = control_stamp(meta.start_epoch_utc)?;
    lines.push(start.clone());

    lines.push(job.points().len().to_string());
    for p in job.points() {
        lines.push(format!(
            "{:.6} {:.6} {:.2}",
            p.latitude, p.longitude, p.height_m_agl
        ));
    }

    let run_hours = signed_run_hours(
        meta.start_epoch_utc,
        meta.end_epoch_utc,
        job.mode().direction_sign(),
    );
    lines.push(run_hours.to_string());
    lines.push(
        physics
            .vertical_motion_code
            .unwrap_or(defaults.vertical_motion_code)
            .to_string(),
    );
    lines.push(real(
        physics
            .top_of_model_m_agl
            .unwrap_or(defaults.top_of_model_m_agl),
    ));

    lines.push(job.met_files().len().to_string());
    for met in job.met_files() {
        lines.push(met.directory.clone());
        lines.push(met.file_name.clone());
    }

    let output = &meta.output_file;
    match job.variant() {
        ModeVariant::TrajectoryForward | ModeVariant::TrajectoryBackward => {
            lines.push(output.directory.clone());
            lines.push(output.file_name.clone());
        }
        ModeVariant::ConcentrationForward(c) => {
            let first = c.cycles.first();
            let releases = c
                .pollutants
                .iter()
                .map(|p| forward_release(p, first))
                .collect::<ComposeResult<Vec<_>>>()?;
            push_concentration(&mut lines, job, &c.pollutants, &releases, &c.grids, defaults)?;
        }
        ModeVariant::ConcentrationBackward(c) => {
            let releases: Vec<Release> = c
                .pollutants
                .iter()
                .map(|_| Release {
                    rate: 0.0,
                    hours: 0.0,
                    start: ZERO_STAMP.to_string(),
                })
                .collect();
            push_concentration(&mut lines, job, &c.pollutants, &releases, &c.grids, defaults)?;
        }
    }

    Ok(ControlFile { lines })
}

/// Forward emission line: mean rate across points in the first cycle.
fn forward_release(pollutant: &PollutantDef, first: Option<&EmissionCycle>) -> ComposeResult<Release> {
    let Some(cycle) = first else {
        return Ok(Release {
            rate: 0.0,
            hours: 0.0,
            start: ZERO_STAMP.to_string(),
        });
    };

    let rates: Vec<f64> = cycle
        .records_for(&pollutant.pollutant_id)
        .map(|r| r.rate)
        .collect();
    let rate = if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };

    Ok(Release {
        rate,
        hours: cycle.duration_s() as f64 / hy_core::SECONDS_PER_HOUR as f64,
        start: control_stamp(cycle.start_epoch_utc)?,
    })
}

fn push_concentration(
    lines: &mut Vec<String>,
    job: &Job,
    pollutants: &[PollutantDef],
    releases: &[Release],
    grids: &[GridDef],
    defaults: &PhysicsDefaults,
) -> ComposeResult<()> {
    let meta = job.meta();

    lines.push(pollutants.len().to_string());
    for (pollutant, release) in pollutants.iter().zip(releases) {
        lines.push(pollutant_code(&pollutant.pollutant_id));
        lines.push(real(release.rate));
        lines.push(real(release.hours));
        lines.push(release.start.clone());
    }

    let run_hours = signed_run_hours(meta.start_epoch_utc, meta.end_epoch_utc, 1);
    let sampling_start = control_stamp(meta.start_epoch_utc)?;
    let sampling = defaults.sampling;

    lines.push(grids.len().to_string());
    for (i, grid) in grids.iter().enumerate() {
        lines.push(format!("{} {}", real(grid.center_lat), real(grid.center_lon)));
        lines.push(format!("{} {}", real(grid.spacing_lat), real(grid.spacing_lon)));
        lines.push(format!("{} {}", grid.span_lat, grid.span_lon));
        lines.push(meta.output_file.directory.clone());
        lines.push(grid_file_name(&meta.output_file.file_name, i));
        lines.push(grid.output_levels_m_agl.len().to_string());
        lines.push(reals(&grid.output_levels_m_agl));
        lines.push(sampling_start.clone());
        lines.push(format!("00 00 00 {:02} 00", run_hours));
        lines.push(format!(
            "{} {} {}",
            sampling.kind, sampling.hours, sampling.minutes
        ));
    }

    let dep = &defaults.deposition;
    lines.push(pollutants.len().to_string());
    for _ in pollutants {
        lines.push(reals(&dep.particle));
        lines.push(reals(&dep.dry));
        lines.push(reals(&dep.wet));
        lines.push(real(dep.half_life_days));
        lines.push(real(dep.resuspension_per_m));
    }

    Ok(())
}

/// First grid writes to `fileName`; later grids get `_2`, `_3`, ...
pub fn grid_file_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(payload: &str) -> Job {
        hy_job::validate_job(&hy_job::parse_json(payload).unwrap()).unwrap()
    }

    #[test]
    fn grid_files_are_numbered_after_the_first() {
        assert_eq!(grid_file_name("cdump", 0), "cdump");
        assert_eq!(grid_file_name("cdump", 1), "cdump_2");
        assert_eq!(grid_file_name("cdump", 2), "cdump_3");
    }

    #[test]
    fn forward_release_without_cycles_is_zero() {
        let pollutant = PollutantDef {
            pollutant_id: "sox".to_string(),
            initial_mass_g: 1.0,
            unit_id: "u1".to_string(),
        };
        let release = forward_release(&pollutant, None).unwrap();
        assert_eq!(release.rate, 0.0);
        assert_eq!(release.start, ZERO_STAMP);
    }

    #[test]
    fn physics_overrides_defaults() {
        let job = job(include_str!("../../../demos/traj_forward.json"));
        let defaults = PhysicsDefaults {
            vertical_motion_code: 3,
            top_of_model_m_agl: 20_000.0,
            ..PhysicsDefaults::default()
        };
        let control = compose_control(&job, &defaults).unwrap();
        // job sets both explicitly
        assert_eq!(control.lines()[5], "0");
        assert_eq!(control.lines()[6], "10000.0");
    }

    #[test]
    fn concentration_section_follows_met_files() {
        let job = job(include_str!("../../../demos/conc_forward.json"));
        let control = compose_control(&job, &PhysicsDefaults::default()).unwrap();
        let lines = control.lines();
        assert_eq!(lines[9], "gfs0p25");
        assert_eq!(lines[10], "2");
        assert_eq!(lines[11], "NOX");
        assert_eq!(lines[14], "25 12 01 00 00");
        assert_eq!(lines[15], "SOX");
        // 2 depositing pollutants x 5 lines close the file
        assert_eq!(lines[lines.len() - 11], "2");
        assert_eq!(lines.last().map(String::as_str), Some("0.0"));
    }
}
