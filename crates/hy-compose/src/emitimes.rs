//! EMITIMES composition for forward concentration runs.
//!
//! One header line per cycle (start, duration in hours, record count),
//! followed by one record per (point, pollutant) in CONTROL pollutant order.

use std::collections::HashMap;

use hy_core::{CalendarTime, PointId, duration_hhmm, duration_hours_ceil};
use hy_job::{Job, ModeVariant, PointDef};

use crate::format::{join_lines, real};
use crate::ComposeResult;

pub const EMITIMES_HEADER: [&str; 2] = [
    "YYYY MM DD HH    DURATION(hhhh) #RECORDS",
    "YYYY MM DD HH MM DURATION(hhmm) LAT LON HGT(m) RATE(/h) AREA(m2) HEAT(w)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitimesFile {
    /// Where the SETUP `efile` entry points.
    pub path: String,
    lines: Vec<String>,
}

impl EmitimesFile {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        join_lines(&self.lines)
    }
}

/// `None` for every mode except forward concentration.
pub fn compose_emitimes(job: &Job) -> ComposeResult<Option<EmitimesFile>> {
    let ModeVariant::ConcentrationForward(conc) = job.variant() else {
        return Ok(None);
    };

    let points: HashMap<PointId, &PointDef> =
        job.points().iter().map(|p| (p.point_id, p)).collect();

    let mut lines: Vec<String> = EMITIMES_HEADER.iter().map(|s| s.to_string()).collect();
    for cycle in &conc.cycles {
        let start = CalendarTime::from_epoch(cycle.start_epoch_utc)?;
        lines.push(format!(
            "{} {:04} {}",
            start.emitimes_hour_stamp(),
            duration_hours_ceil(cycle.duration_s()),
            cycle.records.len()
        ));

        for record in &cycle.records {
            let point = points
                .get(&record.point_id)
                .ok_or(hy_core::HyError::Invariant {
                    what: "emission record point missing from validated job",
                })?;
            lines.push(format!(
                "{} {} {:.6} {:.6} {:.2} {} {} 0.0",
                start.emitimes_minute_stamp(),
                duration_hhmm(cycle.duration_s()),
                point.latitude,
                point.longitude,
                point.height_m_agl,
                real(record.rate),
                real(record.area_m2),
            ));
        }
    }

    Ok(Some(EmitimesFile {
        path: conc.emitimes_file_path.clone(),
        lines,
    }))
}
