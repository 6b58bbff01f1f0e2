use clap::{ArgAction, Parser};

use crate::models::{DisplayFlags, SessionConfig, TargetFlags};

#[derive(Parser, Debug)]
#[command(
    name = "dsp",
    version,
    about = "Test internet download speed",
    long_about = None,
    after_help = "If neither --bit nor --byte is given, --byte is implied.\n\
                  If neither --metric nor --binary is given, --metric is implied.\n\
                  If no test size or URL is given, --medium is implied."
)]
pub struct Cli {
    /// Show result measurements in bits
    #[arg(short = 'b', long, action = ArgAction::SetTrue)]
    pub bit: bool,

    /// Show result measurements in bytes
    #[arg(short = 'B', long, action = ArgAction::SetTrue)]
    pub byte: bool,

    /// Use metric measurements (multiples of 1000)
    #[arg(short = 'm', long, action = ArgAction::SetTrue)]
    pub metric: bool,

    /// Use binary measurements (multiples of 1024)
    #[arg(short = 'i', long, action = ArgAction::SetTrue)]
    pub binary: bool,

    /// Measure results strictly in UNIT: b (bits/bytes), k, m, g or t
    #[arg(short = 'n', long, value_name = "UNIT")]
    pub unit: Option<String>,

    /// Perform test using a small size download (13MB)
    #[arg(short = 'S', long, action = ArgAction::SetTrue)]
    pub small: bool,

    /// Perform test using a medium size download (40MB)
    #[arg(short = 'M', long, action = ArgAction::SetTrue)]
    pub medium: bool,

    /// Perform test using a large size download (82MB)
    #[arg(short = 'L', long, action = ArgAction::SetTrue)]
    pub large: bool,

    /// Perform test with URL instead of a built-in download
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// Quiet mode - no progress line
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Cli {
    pub fn display_flags(&self) -> DisplayFlags {
        DisplayFlags {
            bit: self.bit,
            byte: self.byte,
            metric: self.metric,
            binary: self.binary,
            unit: self.unit.clone(),
        }
    }

    pub fn target_flags(&self) -> TargetFlags {
        TargetFlags {
            small: self.small,
            medium: self.medium,
            large: self.large,
            url: self.url.clone(),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            show_progress: !self.quiet,
            ..Default::default()
        }
    }
}
