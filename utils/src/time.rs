//! Time formatting helpers.

/// Render a remaining duration in seconds, e.g. `"4m 59s"`.
pub fn format_remaining(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_range() {
        assert_eq!(format_remaining(0), "0s");
        assert_eq!(format_remaining(45), "45s");
        assert_eq!(format_remaining(300), "5m 0s");
        assert_eq!(format_remaining(3725), "1h 2m");
    }
}
