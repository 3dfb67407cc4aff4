// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// In-memory tabular dataset parsed from delimited text
// No I/O, no async

mod data_frame;
mod render;

pub use data_frame::DataFrame;

/// Cell values treated as missing when sorting or reading numbers
const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Check if a raw cell value represents a missing value.
/// Any spelling that parses to NaN (`NAN`, `-nan`, ...) counts as missing.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    MISSING_MARKERS.contains(&trimmed) || trimmed.parse::<f64>().is_ok_and(|v| v.is_nan())
}

/// Parse a cell as a number, treating missing markers as `None`
pub fn parse_number(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
