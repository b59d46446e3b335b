//! Readers for composed CONTROL and SETUP text.
//!
//! Free-format: fields are whitespace separated and anything after `#`
//! on a line is ignored.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::setup::{NAMELIST_CLOSE, NAMELIST_OPEN};
use crate::{ComposeError, ComposeResult};

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantLine {
    pub code: String,
    pub rate: f64,
    pub hours: f64,
    pub release_start: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    pub center: (f64, f64),
    pub spacing: (f64, f64),
    pub span: (u32, u32),
    pub output_directory: String,
    pub output_file: String,
    pub levels: Vec<f64>,
    pub sampling_start: String,
    pub sampling_stop: String,
    pub sampling_interval: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlSummary {
    pub start: String,
    pub points: Vec<(f64, f64, f64)>,
    pub run_hours: i64,
    pub vertical_motion_code: u8,
    pub top_of_model_m_agl: f64,
    pub met_files: Vec<(String, String)>,
    /// Trajectory output directory and file.
    pub output: Option<(String, String)>,
    pub pollutants: Vec<PollutantLine>,
    pub grids: Vec<GridLines>,
    pub depositing_pollutants: usize,
}

struct Cursor<'t> {
    lines: std::iter::Enumerate<std::str::Lines<'t>>,
    line_no: usize,
}

impl<'t> Cursor<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            line_no: 0,
        }
    }

    fn err(&self, reason: impl Into<String>) -> ComposeError {
        ComposeError::Parse {
            line: self.line_no,
            reason: reason.into(),
        }
    }

    fn line(&mut self) -> ComposeResult<&'t str> {
        let (i, raw) = self
            .lines
            .next()
            .ok_or_else(|| self.err("unexpected end of file"))?;
        self.line_no = i + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        Ok(content)
    }

    fn value<T: FromStr>(&mut self) -> ComposeResult<T> {
        let line = self.line()?;
        line.parse()
            .map_err(|_| self.err(format!("cannot parse '{}'", line)))
    }

    fn values<T: FromStr>(&mut self) -> ComposeResult<Vec<T>> {
        let line = self.line()?;
        line.split_whitespace()
            .map(|f| f.parse::<T>().map_err(|_| self.err(format!("cannot parse '{}'", f))))
            .collect()
    }

    fn pair<T: FromStr + Copy>(&mut self) -> ComposeResult<(T, T)> {
        match self.values::<T>()?.as_slice() {
            [a, b] => Ok((*a, *b)),
            other => Err(self.err(format!("expected 2 fields, found {}", other.len()))),
        }
    }

    fn text(&mut self) -> ComposeResult<String> {
        Ok(self.line()?.to_string())
    }

    fn is_done(&mut self) -> bool {
        self.lines.clone().all(|(_, l)| l.trim().is_empty())
    }
}

/// Read a CONTROL file back. `concentration` selects the trailing grammar.
pub fn parse_control(text: &str, concentration: bool) -> ComposeResult<ControlSummary> {
    let mut c = Cursor::new(text);
    let mut summary = ControlSummary {
        start: c.text()?,
        ..ControlSummary::default()
    };

    let n_points: usize = c.value()?;
    for _ in 0..n_points {
        match c.values::<f64>()?.as_slice() {
            [lat, lon, hgt] => summary.points.push((*lat, *lon, *hgt)),
            other => return Err(c.err(format!("expected 3 point fields, found {}", other.len()))),
        }
    }

    summary.run_hours = c.value()?;
    summary.vertical_motion_code = c.value()?;
    summary.top_of_model_m_agl = c.value()?;

    let n_met: usize = c.value()?;
    for _ in 0..n_met {
        let dir = c.text()?;
        let file = c.text()?;
        summary.met_files.push((dir, file));
    }

    if !concentration {
        let dir = c.text()?;
        let file = c.text()?;
        summary.output = Some((dir, file));
    } else {
        let n_pollutants: usize = c.value()?;
        for _ in 0..n_pollutants {
            summary.pollutants.push(PollutantLine {
                code: c.text()?,
                rate: c.value()?,
                hours: c.value()?,
                release_start: c.text()?,
            });
        }

        let n_grids: usize = c.value()?;
        for _ in 0..n_grids {
            let center = c.pair()?;
            let spacing = c.pair()?;
            let span = c.pair()?;
            let output_directory = c.text()?;
            let output_file = c.text()?;
            let n_levels: usize = c.value()?;
            let levels: Vec<f64> = c.values()?;
            if levels.len() != n_levels {
                return Err(c.err(format!(
                    "expected {} levels, found {}",
                    n_levels,
                    levels.len()
                )));
            }
            summary.grids.push(GridLines {
                center,
                spacing,
                span,
                output_directory,
                output_file,
                levels,
                sampling_start: c.text()?,
                sampling_stop: c.text()?,
                sampling_interval: c.text()?,
            });
        }

        summary.depositing_pollutants = c.value()?;
        for _ in 0..summary.depositing_pollutants * 5 {
            c.line()?;
        }
    }

    if !c.is_done() {
        return Err(c.err("trailing content after the last section"));
    }
    Ok(summary)
}

/// Read a SETUP namelist into its key/value entries.
pub fn parse_setup(text: &str) -> ComposeResult<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    let mut opened = false;
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(NAMELIST_OPEN.trim()) {
            opened = true;
            continue;
        }
        if line == NAMELIST_CLOSE.trim() {
            return Ok(entries);
        }
        if !opened {
            return Err(ComposeError::Parse {
                line: i + 1,
                reason: "entry before &SETUP".to_string(),
            });
        }
        let (key, value) = line.split_once('=').ok_or_else(|| ComposeError::Parse {
            line: i + 1,
            reason: format!("expected key = value, found '{}'", line),
        })?;
        let value = value.trim().trim_end_matches(',').trim().trim_matches('\'');
        entries.insert(key.trim().to_ascii_lowercase(), value.to_string());
    }
    Err(ComposeError::Parse {
        line: text.lines().count(),
        reason: "namelist not closed".to_string(),
    })
}
