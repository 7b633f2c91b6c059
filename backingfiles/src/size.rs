//! Size requests and their resolution against free space.
//!
//! A request is either absolute (`10G`, `512MB`, `64K`), a percentage of the
//! available space (`50%`), or the literal `0` to leave a drive out.
//! Resolution always yields kilobytes and never exceeds what is available.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use backingfiles_shared::constants::space::{SAFETY_MARGIN_KB, UNIT_BASE};
use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use regex::Regex;

static ABSOLUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([KMG])B?$").expect("valid absolute size regex"));

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)%$").expect("valid percentage regex"));

/// Binary size unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kilo,
    Mega,
    Giga,
}

impl SizeUnit {
    /// Power of 1024 that converts a value in this unit to kilobytes.
    pub fn kb_exponent(&self) -> u32 {
        match self {
            SizeUnit::Kilo => 0,
            SizeUnit::Mega => 1,
            SizeUnit::Giga => 2,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            SizeUnit::Kilo => "K",
            SizeUnit::Mega => "M",
            SizeUnit::Giga => "G",
        }
    }
}

/// A requested drive size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// No drive.
    Zero,
    /// `value` units of `unit`.
    Absolute { value: u64, unit: SizeUnit },
    /// Percentage of the available space. Values above 100 are clamped on resolution.
    Percent(u64),
}

impl SizeSpec {
    /// Whether this request asks for the whole device.
    pub fn is_whole_device(&self) -> bool {
        matches!(self, SizeSpec::Percent(100))
    }

    /// Requested kilobytes of an absolute size, saturating on overflow.
    pub fn absolute_kb(value: u64, unit: SizeUnit) -> u64 {
        value.saturating_mul(UNIT_BASE.saturating_pow(unit.kb_exponent()))
    }
}

impl FromStr for SizeSpec {
    type Err = BackingfilesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "0" {
            return Ok(SizeSpec::Zero);
        }

        if let Some(caps) = PERCENT_RE.captures(s) {
            let percent = parse_number(&caps[1], s)?;
            return Ok(SizeSpec::Percent(percent));
        }

        if let Some(caps) = ABSOLUTE_RE.captures(s) {
            let value = parse_number(&caps[1], s)?;
            let unit = match &caps[2] {
                "K" => SizeUnit::Kilo,
                "M" => SizeUnit::Mega,
                _ => SizeUnit::Giga,
            };
            return Ok(SizeSpec::Absolute { value, unit });
        }

        Err(BackingfilesError::UnsupportedSize(s.to_string()))
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSpec::Zero => f.write_str("0"),
            SizeSpec::Absolute { value, unit } => write!(f, "{}{}", value, unit.suffix()),
            SizeSpec::Percent(p) => write!(f, "{}%", p),
        }
    }
}

fn parse_number(digits: &str, original: &str) -> BackingfilesResult<u64> {
    digits
        .parse::<u64>()
        .map_err(|_| BackingfilesError::UnsupportedSize(original.to_string()))
}

/// Space usable for new drives, given the free kilobytes reported for the device.
///
/// Subtracts the safety margin; returns 0 when the margin is not covered.
pub fn available_kb(free_kb: u64) -> u64 {
    free_kb.saturating_sub(SAFETY_MARGIN_KB)
}

/// Resolve a request to kilobytes, clamped to the available space.
///
/// Oversized requests are clamped rather than rejected, so asking for more
/// than the device holds means "take everything left".
pub fn resolve_size(spec: &SizeSpec, free_kb: u64) -> u64 {
    let available = available_kb(free_kb);
    if available == 0 {
        return 0;
    }

    let requested = match *spec {
        SizeSpec::Zero => 0,
        SizeSpec::Percent(p) => {
            let scaled = available as u128 * p as u128 / 100;
            u64::try_from(scaled).unwrap_or(u64::MAX)
        }
        SizeSpec::Absolute { value, unit } => SizeSpec::absolute_kb(value, unit),
    };

    let resolved = requested.min(available);
    if resolved < requested {
        tracing::debug!(
            "Clamped size request {} ({}K) to available {}K",
            spec,
            requested,
            available
        );
    }
    resolved
}
