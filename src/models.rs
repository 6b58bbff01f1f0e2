use std::{fmt, time::Instant};

use url::Url;

use crate::{ConfigError, MAX_REDIRECTS, UNKNOWN_DISPLAY, USER_AGENT};

/// One progress tick as delivered by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Expected download size, 0 while unknown.
    pub download_total: u64,
    pub downloaded: u64,
    pub upload_total: u64,
    pub uploaded: u64,
}

impl TransferProgress {
    pub fn download(download_total: u64, downloaded: u64) -> Self {
        Self {
            download_total,
            downloaded,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Domain {
    Bit,
    #[default]
    Byte,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitSystem {
    #[default]
    Metric,
    Binary,
}

impl UnitSystem {
    /// The first scaling threshold: 1000 (SI) or 1024 (IEC).
    pub fn base(self) -> u128 {
        match self {
            UnitSystem::Metric => 1000,
            UnitSystem::Binary => 1024,
        }
    }

    pub fn divisor(self, rank: u32) -> u128 {
        self.base().pow(rank)
    }
}

/// Explicit unit chosen with `-n`/`--unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSelector {
    Plain,
    Kilo,
    Mega,
    Giga,
    Tera,
}

impl UnitSelector {
    pub fn from_letter(value: &str) -> Result<Self, ConfigError> {
        let mut chars = value.chars();
        let selector = match (chars.next(), chars.next()) {
            (Some(c), None) => match c.to_ascii_lowercase() {
                'b' => Some(UnitSelector::Plain),
                'k' => Some(UnitSelector::Kilo),
                'm' => Some(UnitSelector::Mega),
                'g' => Some(UnitSelector::Giga),
                't' => Some(UnitSelector::Tera),
                _ => None,
            },
            _ => None,
        };
        selector.ok_or_else(|| ConfigError::InvalidUnit(value.to_string()))
    }

    pub fn rank(self) -> u32 {
        match self {
            UnitSelector::Plain => 0,
            UnitSelector::Kilo => 1,
            UnitSelector::Mega => 2,
            UnitSelector::Giga => 3,
            UnitSelector::Tera => 4,
        }
    }
}

const BYTE_METRIC_SYMBOLS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
const BYTE_BINARY_SYMBOLS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
const BIT_METRIC_SYMBOLS: [&str; 5] = ["bit", "kbit", "Mbit", "Gbit", "Tbit"];
const BIT_BINARY_SYMBOLS: [&str; 5] = ["bit", "Kibit", "Mibit", "Gibit", "Tibit"];

/// How byte quantities are rendered. Resolved once, before any formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayMode {
    pub domain: Domain,
    pub system: UnitSystem,
    pub unit: Option<UnitSelector>,
}

impl DisplayMode {
    /// Unit symbols indexed by rank (plain, kilo, mega, giga, tera).
    pub fn symbols(&self) -> &'static [&'static str; 5] {
        match (self.domain, self.system) {
            (Domain::Byte, UnitSystem::Metric) => &BYTE_METRIC_SYMBOLS,
            (Domain::Byte, UnitSystem::Binary) => &BYTE_BINARY_SYMBOLS,
            (Domain::Bit, UnitSystem::Metric) => &BIT_METRIC_SYMBOLS,
            (Domain::Bit, UnitSystem::Binary) => &BIT_BINARY_SYMBOLS,
        }
    }
}

/// Raw display flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct DisplayFlags {
    pub bit: bool,
    pub byte: bool,
    pub metric: bool,
    pub binary: bool,
    pub unit: Option<String>,
}

impl DisplayFlags {
    pub fn resolve(&self) -> Result<DisplayMode, ConfigError> {
        if self.bit && self.byte {
            return Err(ConfigError::BitAndByte);
        }
        if self.metric && self.binary {
            return Err(ConfigError::MetricAndBinary);
        }

        let unit = self
            .unit
            .as_deref()
            .map(UnitSelector::from_letter)
            .transpose()?;

        Ok(DisplayMode {
            domain: if self.bit { Domain::Bit } else { Domain::Byte },
            system: if self.binary {
                UnitSystem::Binary
            } else {
                UnitSystem::Metric
            },
            unit,
        })
    }
}

/// Built-in payloads hosted on the GNU mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    pub fn url(self) -> &'static str {
        match self {
            SizeTier::Small => "https://ftp.gnu.org/gnu/gcc/gcc-2.95.1.tar.gz",
            SizeTier::Medium => "https://ftp.gnu.org/gnu/gcc/gcc-4.7.0/gcc-4.6.3-4.7.0.diff.gz",
            SizeTier::Large => "https://ftp.gnu.org/gnu/gcc/gcc-4.4.5/gcc-4.4.5.tar.gz",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeTier::Small => "small",
            SizeTier::Medium => "medium",
            SizeTier::Large => "large",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            SizeTier::Small => "`-S'/`--small'",
            SizeTier::Medium => "`-M'/`--medium'",
            SizeTier::Large => "`-L'/`--large'",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    Url(Url),
    Tier(SizeTier),
}

impl TargetSelection {
    pub fn url(&self) -> &str {
        match self {
            TargetSelection::Url(url) => url.as_str(),
            TargetSelection::Tier(tier) => tier.url(),
        }
    }

    /// Short label used for the temporary sink name.
    pub fn test_name(&self) -> &'static str {
        match self {
            TargetSelection::Url(_) => "user",
            TargetSelection::Tier(tier) => tier.name(),
        }
    }
}

/// Raw target flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct TargetFlags {
    pub small: bool,
    pub medium: bool,
    pub large: bool,
    pub url: Option<String>,
}

impl TargetFlags {
    pub fn resolve(&self) -> Result<TargetSelection, ConfigError> {
        let tiers: Vec<SizeTier> = [
            (self.small, SizeTier::Small),
            (self.medium, SizeTier::Medium),
            (self.large, SizeTier::Large),
        ]
        .into_iter()
        .filter_map(|(set, tier)| set.then_some(tier))
        .collect();

        if let [first, second, ..] = tiers.as_slice() {
            return Err(ConfigError::ConflictingTiers(first.flag(), second.flag()));
        }

        match (self.url.as_deref().filter(|url| !url.is_empty()), tiers.first()) {
            (Some(_), Some(tier)) => Err(ConfigError::TierAndUrl(tier.flag())),
            (Some(raw), None) => parse_target_url(raw).map(TargetSelection::Url),
            (None, Some(tier)) => Ok(TargetSelection::Tier(*tier)),
            (None, None) => Ok(TargetSelection::Tier(SizeTier::Medium)),
        }
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{}'", other))),
    }
}

/// Everything measured during one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementState {
    /// Set once, from the first non-zero total hint.
    pub total_bytes: Option<u64>,
    pub most_bytes_per_sec: Option<u64>,
    pub least_bytes_per_sec: Option<u64>,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
}

impl MeasurementState {
    /// Whole seconds between start and end, if both were recorded.
    pub fn elapsed_secs(&self) -> Option<i64> {
        let (start, end) = (self.start_time?, self.end_time?);
        let elapsed = if end >= start {
            end.duration_since(start).as_secs() as i64
        } else {
            -(start.duration_since(end).as_secs() as i64)
        };
        Some(elapsed)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    pub max_redirects: usize,
    pub show_progress: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            max_redirects: MAX_REDIRECTS,
            show_progress: true,
        }
    }
}

/// The five result lines. `None` means the value was never established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedReport {
    pub duration: Option<String>,
    pub total_size: Option<String>,
    pub average_rate: Option<String>,
    pub peak_rate: Option<String>,
    pub lowest_rate: Option<String>,
}

impl fmt::Display for FormattedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("Total d/l time:   ", &self.duration),
            ("Total d/l size:   ", &self.total_size),
            ("Average d/l rate: ", &self.average_rate),
            ("Peak d/l rate:    ", &self.peak_rate),
            ("Lowest d/l rate:  ", &self.lowest_rate),
        ];
        for (tag, value) in lines {
            writeln!(f, "{}{}", tag, value.as_deref().unwrap_or(UNKNOWN_DISPLAY))?;
        }
        Ok(())
    }
}
