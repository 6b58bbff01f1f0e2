use crate::{
    SECONDS_IN_DAY, SECONDS_IN_HOUR, SECONDS_IN_MINUTE,
    models::{Domain, DisplayMode, UnitSelector},
};

/// Decimal places used when an explicit unit is forced with `--unit`.
pub const EXPLICIT_UNIT_PRECISION: usize = 2;
/// Decimal places used for auto-scaled byte quantities. Auto-scaled bit
/// quantities are truncated to an integer quotient instead.
pub const AUTO_BYTE_PRECISION: usize = 1;

/// Renders a byte count according to `mode`.
///
/// An explicit unit always wins over auto-scaling. Without one, values below
/// the first threshold (1000 or 1024) are shown as a bare integer, and larger
/// values use the biggest unit whose divisor fits at least once.
pub fn format_size(bytes: u64, mode: &DisplayMode) -> String {
    let raw = match mode.domain {
        Domain::Byte => u128::from(bytes),
        Domain::Bit => u128::from(bytes) * 8,
    };
    let symbols = mode.symbols();

    match mode.unit {
        Some(UnitSelector::Plain) => format!("{} {}", raw, symbols[0]),
        Some(unit) => {
            let rank = unit.rank();
            let divisor = mode.system.divisor(rank);
            format!(
                "{:.*} {}",
                EXPLICIT_UNIT_PRECISION,
                raw as f64 / divisor as f64,
                symbols[rank as usize]
            )
        }
        None => {
            if raw < mode.system.base() {
                return format!("{} {}", raw, symbols[0]);
            }
            let rank = (1..=4u32)
                .rev()
                .find(|&rank| raw / mode.system.divisor(rank) > 0)
                .unwrap_or(1);
            let divisor = mode.system.divisor(rank);
            let symbol = symbols[rank as usize];
            match mode.domain {
                Domain::Byte => format!(
                    "{:.*} {}",
                    AUTO_BYTE_PRECISION,
                    raw as f64 / divisor as f64,
                    symbol
                ),
                Domain::Bit => format!("{} {}", raw / divisor, symbol),
            }
        }
    }
}

/// Same as [`format_size`], but an unset quantity stays unavailable.
pub fn format_known_size(bytes: Option<u64>, mode: &DisplayMode) -> Option<String> {
    bytes.map(|b| format_size(b, mode)).and_then(non_empty)
}

/// Rate for a single one-second sample.
pub fn format_rate(bytes_per_sec: Option<u64>, mode: &DisplayMode) -> Option<String> {
    format_known_size(bytes_per_sec, mode).map(|size| format!("{}/s", size))
}

/// Average rate over the whole transfer. The divisor never drops below one
/// second, so zero-length transfers don't divide by zero.
pub fn format_average_rate(
    total_bytes: Option<u64>,
    elapsed_secs: Option<i64>,
    mode: &DisplayMode,
) -> Option<String> {
    let elapsed = elapsed_secs?.unsigned_abs().max(1);
    format_rate(total_bytes.map(|total| total / elapsed), mode)
}

/// Day/hour/minute/second breakdown, e.g. `"1 minute 1 second"`.
///
/// Zero components are skipped. When the last shown component is coarser
/// than seconds, `"exactly"` is appended. Zero seconds yields `""`.
pub fn format_duration(seconds: i64) -> String {
    let elapsed = seconds.unsigned_abs();
    let components = [
        (elapsed / SECONDS_IN_DAY, "day"),
        (elapsed % SECONDS_IN_DAY / SECONDS_IN_HOUR, "hour"),
        (elapsed % SECONDS_IN_HOUR / SECONDS_IN_MINUTE, "minute"),
        (elapsed % SECONDS_IN_MINUTE, "second"),
    ];

    let mut parts: Vec<String> = components
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, noun)| {
            let plural = if *count == 1 { "" } else { "s" };
            format!("{} {}{}", count, noun, plural)
        })
        .collect();

    if !parts.is_empty() && elapsed % SECONDS_IN_MINUTE == 0 {
        parts.push("exactly".to_string());
    }
    parts.join(" ")
}

/// Share of the payload received so far, 0 when the total is unknown.
pub fn percent_complete(transferred: u64, total_hint: u64) -> f64 {
    if total_hint == 0 {
        return 0.0;
    }
    transferred as f64 / total_hint as f64 * 100.0
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitSystem;
    use proptest::prelude::*;

    fn mode(domain: Domain, system: UnitSystem, unit: Option<UnitSelector>) -> DisplayMode {
        DisplayMode { domain, system, unit }
    }

    const BYTE_METRIC: DisplayMode = DisplayMode {
        domain: Domain::Byte,
        system: UnitSystem::Metric,
        unit: None,
    };

    #[test]
    fn zero_is_plain() {
        assert_eq!(format_size(0, &BYTE_METRIC), "0 B");
        assert_eq!(format_size(0, &mode(Domain::Bit, UnitSystem::Binary, None)), "0 bit");
    }

    #[test]
    fn auto_bytes_metric() {
        assert_eq!(format_size(999, &BYTE_METRIC), "999 B");
        assert_eq!(format_size(1_000, &BYTE_METRIC), "1.0 kB");
        assert_eq!(format_size(200_000, &BYTE_METRIC), "200.0 kB");
        assert_eq!(format_size(1_000_000, &BYTE_METRIC), "1.0 MB");
        assert_eq!(format_size(12_870_000, &BYTE_METRIC), "12.9 MB");
        assert_eq!(format_size(2_500_000_000, &BYTE_METRIC), "2.5 GB");
        assert_eq!(format_size(3_000_000_000_000, &BYTE_METRIC), "3.0 TB");
    }

    #[test]
    fn auto_bytes_binary() {
        let m = mode(Domain::Byte, UnitSystem::Binary, None);
        assert_eq!(format_size(1_000, &m), "1000 B");
        assert_eq!(format_size(1_024, &m), "1.0 KiB");
        assert_eq!(format_size(1_536, &m), "1.5 KiB");
        assert_eq!(format_size(1_048_576, &m), "1.0 MiB");
        assert_eq!(format_size(1_073_741_824, &m), "1.0 GiB");
    }

    #[test]
    fn auto_bits_truncate_to_integer() {
        let metric = mode(Domain::Bit, UnitSystem::Metric, None);
        assert_eq!(format_size(100, &metric), "800 bit");
        assert_eq!(format_size(125, &metric), "1 kbit");
        assert_eq!(format_size(1_000, &metric), "8 kbit");
        assert_eq!(format_size(1_000_000, &metric), "8 Mbit");
        assert_eq!(format_size(1_999_999, &metric), "15 Mbit");

        let binary = mode(Domain::Bit, UnitSystem::Binary, None);
        assert_eq!(format_size(128, &binary), "1 Kibit");
        assert_eq!(format_size(1_000_000, &binary), "7 Mibit");
    }

    #[test]
    fn bit_mode_does_not_overflow() {
        let m = mode(Domain::Bit, UnitSystem::Metric, Some(UnitSelector::Plain));
        assert_eq!(format_size(u64::MAX, &m), format!("{} bit", u128::from(u64::MAX) * 8));
        let auto = mode(Domain::Bit, UnitSystem::Binary, None);
        assert!(format_size(u64::MAX, &auto).ends_with(" Tibit"));
    }

    #[test]
    fn explicit_unit_overrides_auto_scaling() {
        let kilo = mode(Domain::Byte, UnitSystem::Metric, Some(UnitSelector::Kilo));
        assert_eq!(format_size(500, &kilo), "0.50 kB");

        let mega = mode(Domain::Byte, UnitSystem::Metric, Some(UnitSelector::Mega));
        assert_eq!(format_size(500, &mega), "0.00 MB");
        assert_eq!(format_size(1_500_000_000, &mega), "1500.00 MB");

        let kibi = mode(Domain::Byte, UnitSystem::Binary, Some(UnitSelector::Kilo));
        assert_eq!(format_size(512, &kibi), "0.50 KiB");

        let gigabit = mode(Domain::Bit, UnitSystem::Metric, Some(UnitSelector::Giga));
        assert_eq!(format_size(250_000_000, &gigabit), "2.00 Gbit");

        let tebi = mode(Domain::Byte, UnitSystem::Binary, Some(UnitSelector::Tera));
        assert_eq!(format_size(1_099_511_627_776, &tebi), "1.00 TiB");
    }

    #[test]
    fn explicit_plain_has_no_decimal_point() {
        let bytes = mode(Domain::Byte, UnitSystem::Binary, Some(UnitSelector::Plain));
        assert_eq!(format_size(1_048_576, &bytes), "1048576 B");
        let bits = mode(Domain::Bit, UnitSystem::Metric, Some(UnitSelector::Plain));
        assert_eq!(format_size(1_000, &bits), "8000 bit");
    }

    #[test]
    fn unset_quantities_stay_unavailable() {
        assert_eq!(format_known_size(None, &BYTE_METRIC), None);
        assert_eq!(format_rate(None, &BYTE_METRIC), None);
        assert_eq!(format_average_rate(None, Some(5), &BYTE_METRIC), None);
        assert_eq!(format_average_rate(Some(10), None, &BYTE_METRIC), None);
    }

    #[test]
    fn rates_append_per_second() {
        assert_eq!(format_rate(Some(200_000), &BYTE_METRIC).as_deref(), Some("200.0 kB/s"));
        assert_eq!(format_rate(Some(0), &BYTE_METRIC).as_deref(), Some("0 B/s"));
    }

    #[test]
    fn average_rate_divides_by_at_least_one_second() {
        assert_eq!(
            format_average_rate(Some(1_000_000), Some(5), &BYTE_METRIC).as_deref(),
            Some("200.0 kB/s")
        );
        assert_eq!(
            format_average_rate(Some(1_000_000), Some(-5), &BYTE_METRIC).as_deref(),
            Some("200.0 kB/s")
        );
        assert_eq!(
            format_average_rate(Some(4_000), Some(0), &BYTE_METRIC).as_deref(),
            Some("4.0 kB/s")
        );
    }

    #[test]
    fn duration_breakdown() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(5), "5 seconds");
        assert_eq!(format_duration(60), "1 minute exactly");
        assert_eq!(format_duration(61), "1 minute 1 second");
        assert_eq!(format_duration(125), "2 minutes 5 seconds");
        assert_eq!(format_duration(3_600), "1 hour exactly");
        assert_eq!(format_duration(3_601), "1 hour 1 second");
        assert_eq!(format_duration(7_260), "2 hours 1 minute exactly");
        assert_eq!(format_duration(86_400), "1 day exactly");
        assert_eq!(format_duration(2 * 86_400 + 3_600 + 61), "2 days 1 hour 1 minute 1 second");
        assert_eq!(format_duration(-61), "1 minute 1 second");
    }

    #[test]
    fn percent_handles_unknown_total() {
        assert_eq!(percent_complete(500, 0), 0.0);
        assert_eq!(percent_complete(0, 0), 0.0);
        assert_eq!(percent_complete(250, 1_000), 25.0);
        assert_eq!(percent_complete(1_000, 1_000), 100.0);
    }

    fn any_mode() -> impl Strategy<Value = DisplayMode> {
        let domain = prop_oneof![Just(Domain::Byte), Just(Domain::Bit)];
        let system = prop_oneof![Just(UnitSystem::Metric), Just(UnitSystem::Binary)];
        let unit = prop_oneof![
            Just(None),
            Just(Some(UnitSelector::Plain)),
            Just(Some(UnitSelector::Kilo)),
            Just(Some(UnitSelector::Mega)),
            Just(Some(UnitSelector::Giga)),
            Just(Some(UnitSelector::Tera)),
        ];
        (domain, system, unit).prop_map(|(domain, system, unit)| DisplayMode { domain, system, unit })
    }

    proptest! {
        #[test]
        fn formatted_size_reconstructs_value(bytes in 0u64..(1u64 << 40), mode in any_mode()) {
            let out = format_size(bytes, &mode);
            let (number, symbol) = out.split_once(' ').expect("value and unit");
            let rank = mode
                .symbols()
                .iter()
                .position(|s| *s == symbol)
                .expect("known symbol");
            let raw = match mode.domain {
                Domain::Byte => bytes as f64,
                Domain::Bit => bytes as f64 * 8.0,
            };
            let divisor = mode.system.divisor(rank as u32) as f64;
            let rebuilt = number.parse::<f64>().expect("numeric value") * divisor;

            let tolerance = match (mode.unit, mode.domain) {
                (Some(UnitSelector::Plain), _) => 0.0,
                (Some(_), _) => 0.005 * divisor,
                (None, _) if rank == 0 => 0.0,
                (None, Domain::Byte) => 0.05 * divisor,
                (None, Domain::Bit) => divisor,
            };
            prop_assert!((rebuilt - raw).abs() <= tolerance + 1e-9 * raw.max(1.0), "{} -> {}", bytes, out);
        }

        #[test]
        fn duration_never_panics_and_zero_is_empty(seconds in any::<i64>()) {
            let out = format_duration(seconds);
            prop_assert_eq!(out.is_empty(), seconds == 0);
        }
    }
}
