//! Tape layout mini-language
//!
//! A format string is a sequence of directives, each a marker letter
//! followed by an argument:
//! - `b<seconds>`: blank (silence)
//! - `h<seconds>`: header tone (continuous mark carrier)
//! - `d<count>`: data block of `count` bytes, or until the input runs out
//!   when the count is missing or zero
//!
//! Characters other than the markers are skipped, so directives may be
//! separated by spaces or anything else.

use std::fmt;
use std::str::FromStr;

/// Built-in tape layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPreset {
    /// BASIC program: 16-byte file header block, then the program body
    Default,
    /// Machine-language image loaded through the I/O routine
    Io,
    /// Single unframed binary block
    Bin,
}

impl FormatPreset {
    pub fn format_string(self) -> &'static str {
        match self {
            FormatPreset::Default => "b2.0 h3.5 d16 h0.5 d h0.05 b0.6",
            FormatPreset::Io => "b2.0 h3.5 d17 h0.05 b3.5 h3.5 d h0.05 b0.6",
            FormatPreset::Bin => "b2.0 h3.5 d h0.05 b0.6",
        }
    }

    /// Resolve a command-line format argument: preset name or literal format
    pub fn resolve(arg: &str) -> String {
        match arg.parse::<FormatPreset>() {
            Ok(preset) => preset.format_string().to_string(),
            Err(_) => arg.to_string(),
        }
    }
}

impl FromStr for FormatPreset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(FormatPreset::Default),
            "io" => Ok(FormatPreset::Io),
            "bin" => Ok(FormatPreset::Bin),
            _ => Err(()),
        }
    }
}

/// Byte budget of a data directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLength {
    Bytes(usize),
    /// Until the byte source is exhausted
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentDirective {
    /// Silence for the given seconds
    Blank(f64),
    /// Mark tone for at least the given seconds
    Header(f64),
    /// Framed payload bytes
    Data(DataLength),
}

impl fmt::Display for SegmentDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentDirective::Blank(secs) => write!(f, "blank {}s", secs),
            SegmentDirective::Header(secs) => write!(f, "header {}s", secs),
            SegmentDirective::Data(DataLength::Bytes(n)) => write!(f, "data {} bytes", n),
            SegmentDirective::Data(DataLength::Unbounded) => write!(f, "data until end of input"),
        }
    }
}

/// Parse a format string into its directives.
///
/// Scanning looks for the next `b`, `h` or `d` from the current position
/// and resumes right after each marker. Arguments skip leading whitespace
/// and take the longest numeric prefix. An unparsable duration repeats the
/// last duration given to any `b` or `h` (zero before the first one); a
/// zero or unparsable byte count means "until end of input" and a negative
/// one means no bytes.
pub fn parse_format(format: &str) -> Vec<SegmentDirective> {
    let bytes = format.as_bytes();
    let mut directives = Vec::new();
    let mut last_duration = 0.0;

    for (pos, &marker) in bytes.iter().enumerate() {
        // Markers are ASCII, so pos + 1 is always a char boundary
        let directive = match marker {
            b'b' => {
                last_duration = duration_arg(&format[pos + 1..], marker, last_duration);
                SegmentDirective::Blank(last_duration)
            }
            b'h' => {
                last_duration = duration_arg(&format[pos + 1..], marker, last_duration);
                SegmentDirective::Header(last_duration)
            }
            b'd' => SegmentDirective::Data(match scan_int(&format[pos + 1..]) {
                Some(0) | None => DataLength::Unbounded,
                Some(n) if n < 0 => DataLength::Bytes(0),
                Some(n) => DataLength::Bytes(usize::try_from(n).unwrap_or(usize::MAX)),
            }),
            _ => continue,
        };
        directives.push(directive);
    }

    directives
}

fn duration_arg(arg: &str, marker: u8, previous: f64) -> f64 {
    match scan_float(arg) {
        Some(secs) => secs,
        None => {
            log::warn!(
                "No duration after '{}' in format string, reusing {} seconds",
                marker as char,
                previous
            );
            previous
        }
    }
}

/// Length of the run of ASCII digits at the start of `s`
fn digit_run(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign_len(s: &[u8]) -> usize {
    match s.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    }
}

/// Leading decimal integer, after optional whitespace and sign
fn scan_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let sign = sign_len(b);
    let digits = digit_run(&b[sign..]);
    if digits == 0 {
        return None;
    }

    let text = &s[..sign + digits];
    text.parse::<i64>().ok().or_else(|| {
        // Saturate out-of-range counts instead of dropping them
        Some(if text.starts_with('-') { i64::MIN } else { i64::MAX })
    })
}

/// Leading decimal float, after optional whitespace
fn scan_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();

    let mut end = sign_len(b);
    let int_digits = digit_run(&b[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = digit_run(&b[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(b.get(end), Some(b'e') | Some(b'E')) {
        let exp_sign = sign_len(&b[end + 1..]);
        let exp_digits = digit_run(&b[end + 1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}
