//! `H:MM:SS` conversions used by AVTransport time fields.

use thiserror::Error;

/// A time string that is not `H:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time '{input}': {reason}")]
pub struct TimeParseError {
    pub input: String,
    pub reason: &'static str,
}

impl TimeParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse `H:MM:SS` (as found in `AbsTime`/`RelTime`) into whole seconds.
///
/// Exactly three segments are required. A fractional part on the seconds
/// segment (`0:03:52.500`) is truncated.
pub fn parse_hms(input: &str) -> Result<u32, TimeParseError> {
    let trimmed = input.trim();
    let segments: Vec<&str> = trimmed.split(':').collect();
    if segments.len() != 3 {
        return Err(TimeParseError::new(input, "expected three ':'-separated segments"));
    }

    let number = |segment: &str| -> Result<u32, TimeParseError> {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeParseError::new(input, "segment is not a number"));
        }
        segment
            .parse::<u32>()
            .map_err(|_| TimeParseError::new(input, "segment out of range"))
    };

    let seconds_part = match segments[2].split_once('.') {
        Some((whole, fraction)) => {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimeParseError::new(input, "fraction is not a number"));
            }
            whole
        }
        None => segments[2],
    };

    let hours = number(segments[0])?;
    let minutes = number(segments[1])?;
    let seconds = number(seconds_part)?;

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| TimeParseError::new(input, "value overflows"))
}

/// `H:MM:SS`, hours unpadded.
pub fn format_hms(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// `H:MM:SS.000`, the form DIDL-Lite `res@duration` expects.
pub fn format_duration(total_seconds: u32) -> String {
    format!("{}.000", format_hms(total_seconds))
}
