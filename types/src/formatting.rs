//! Time formatting for timeline labels.
//!
//! All clock and countdown text shown by the overlay goes through this
//! module so the layouts agree on rounding, and so European-style decimal
//! separators are applied in one place.

/// Swap `.` and `,` in a formatted number.
fn europeanize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' => ',',
            ',' => '.',
            other => other,
        })
        .collect()
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a countdown value for overlay display.
///
/// - Values >= 60s: `M:SS`
/// - Values >= 10s: whole seconds
/// - Values < 10s: one decimal place
/// - Values <= 0: returns the provided `zero_label`
///
/// # Examples
/// ```
/// use cadence_types::formatting::format_countdown;
/// assert_eq!(format_countdown(75.3, "0:00", false), "1:15");
/// assert_eq!(format_countdown(15.7, "0:00", false), "16");
/// assert_eq!(format_countdown(3.5, "0:00", false), "3.5");
/// assert_eq!(format_countdown(3.5, "0:00", true), "3,5");
/// assert_eq!(format_countdown(0.0, "Now", false), "Now");
/// ```
pub fn format_countdown(secs: f32, zero_label: &str, european: bool) -> String {
    if secs <= 0.0 {
        return zero_label.to_string();
    }
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor() as u32;
        let rem = (secs % 60.0).floor() as u32;
        format!("{}:{:02}", mins, rem)
    } else if secs >= 10.0 {
        format!("{:.0}", secs)
    } else {
        maybe_eu(format!("{:.1}", secs), european)
    }
}

/// Format an encounter clock as `M:SS`, with a leading `-` during prepull.
///
/// Fractions are truncated toward zero so the clock flips to `0:00`
/// exactly at the pull.
///
/// # Examples
/// ```
/// use cadence_types::formatting::format_encounter_clock;
/// assert_eq!(format_encounter_clock(125.9), "2:05");
/// assert_eq!(format_encounter_clock(-5.2), "-0:05");
/// assert_eq!(format_encounter_clock(-0.4), "0:00");
/// ```
pub fn format_encounter_clock(secs: f32) -> String {
    let whole = secs.trunc() as i64;
    let sign = if whole < 0 { "-" } else { "" };
    let abs = whole.unsigned_abs();
    format!("{}{}:{:02}", sign, abs / 60, abs % 60)
}

/// Format a marker timestamp for editors and list rows as `M:SS.s`.
///
/// # Examples
/// ```
/// use cadence_types::formatting::format_timestamp;
/// assert_eq!(format_timestamp(62.5, false), "1:02.5");
/// assert_eq!(format_timestamp(62.5, true), "1:02,5");
/// assert_eq!(format_timestamp(0.0, false), "0:00.0");
/// ```
pub fn format_timestamp(secs: f32, european: bool) -> String {
    let secs = secs.max(0.0);
    let mins = (secs / 60.0).floor() as u32;
    let rem = secs - mins as f32 * 60.0;
    maybe_eu(format!("{}:{:04.1}", mins, rem), european)
}

/// Format a duration as `M:SS`.
///
/// # Examples
/// ```
/// use cadence_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
