//! Number and identifier formatting shared by the text artifacts.

/// Shortest round-trip form, always with a decimal point.
pub fn real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

pub fn reals(values: &[f64]) -> String {
    values.iter().map(|v| real(*v)).collect::<Vec<_>>().join(" ")
}

pub use hy_job::pollutant_code;

pub(crate) fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
