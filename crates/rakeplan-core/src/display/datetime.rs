//! Timestamp display helpers.

use std::fmt;

use jiff::{tz::TimeZone, SignedDuration, Timestamp};

/// Formats a timestamp in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Formats the time between two instants as `1h 02m 03s`, `2m 03s` or `4s`.
pub struct Elapsed {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self
            .to
            .duration_since(self.from)
            .max(SignedDuration::ZERO)
            .as_secs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            write!(f, "{hours}h {minutes:02}m {seconds:02}s")
        } else if minutes > 0 {
            write!(f, "{minutes}m {seconds:02}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elapsed(seconds: i64) -> String {
        let from = Timestamp::from_second(1_759_651_200).unwrap();
        let to = Timestamp::from_second(1_759_651_200 + seconds).unwrap();
        Elapsed { from, to }.to_string()
    }

    #[test]
    fn test_elapsed_formats() {
        assert_eq!(elapsed(4), "4s");
        assert_eq!(elapsed(123), "2m 03s");
        assert_eq!(elapsed(3723), "1h 02m 03s");
        assert_eq!(elapsed(-10), "0s");
    }
}
