use std::time::Duration;

/// Binary size units, largest first. Shared by formatting and parsing.
const UNITS: [(&str, u64); 4] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
];

/// Human-readable size, e.g. `"512 B"` or `"1.50 GB"`.
pub fn format_bytes(bytes: u64) -> String {
    UNITS
        .iter()
        .find(|(_, scale)| bytes >= *scale)
        .map(|(unit, scale)| format!("{:.2} {}", bytes as f64 / *scale as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

/// Elapsed time for scan summaries: milliseconds, then tenths of a second,
/// then minutes and hours.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0 => format!("{}ms", duration.as_millis()),
        1..=59 => format!("{:.1}s", duration.as_secs_f64()),
        60..=3599 => format!("{}m {:02}s", secs / 60, secs % 60),
        _ => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
    }
}

/// Parse sizes like `"100MB"`, `"1.5 GB"` or `"512"` into bytes (binary units).
pub fn parse_size_string(s: &str) -> Result<u64, String> {
    let upper = s.trim().to_uppercase();

    let (num_str, multiplier) = UNITS
        .iter()
        .find_map(|(unit, scale)| upper.strip_suffix(*unit).map(|rest| (rest, *scale)))
        .or_else(|| upper.strip_suffix('B').map(|rest| (rest, 1)))
        .unwrap_or((upper.as_str(), 1));

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid size value: {}", s))?;

    if !num.is_finite() {
        return Err(format!("Size must be a finite number: {}", s));
    }
    if num < 0.0 {
        return Err(format!("Size cannot be negative: {}", s));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MB");
        assert_eq!(format_bytes(1 << 30), "1.00 GB");
        assert_eq!(format_bytes(1 << 40), "1.00 TB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(4500)), "4.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 01m");
    }

    #[test]
    fn test_parse_size_string() {
        assert_eq!(parse_size_string("512B").unwrap(), 512);
        assert_eq!(parse_size_string("1KB").unwrap(), 1024);
        assert_eq!(parse_size_string("1.5 MB").unwrap(), 1_572_864);
        assert_eq!(parse_size_string("100mb").unwrap(), 104_857_600);
        assert_eq!(parse_size_string("2GB").unwrap(), 2_147_483_648);
        assert_eq!(parse_size_string("100").unwrap(), 100);
        assert!(parse_size_string("lots").is_err());
        assert!(parse_size_string("-1MB").is_err());
    }

    #[test]
    fn test_parse_size_rejects_non_finite() {
        for value in ["nan", "NaN MB", "inf", "-inf", "infinity GB"] {
            assert!(parse_size_string(value).is_err(), "{} was accepted", value);
        }
    }
}
