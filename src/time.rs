/*
Wall-clock helpers.
Everything on the timeline is counted in minutes since midnight.
*/

use chrono::{DateTime, FixedOffset, Local};

use crate::error::TimeError;

pub const DAY_MINUTES: u32 = 24 * 60;

// Parse "HH:mm" (or "H:mm") into minutes since midnight.
//
// Only ASCII digits are accepted: no sign, no padding spaces, exactly two
// minute digits. Hours are not range-checked here: "24:00" is a valid end
// of day and anything beyond it is rejected later, when the span is
// normalized.
pub fn parse_hhmm(text: &str) -> Result<u32, TimeError> {
    let Some((h, m)) = text.split_once(':') else {
        return Err(TimeError::MissingSeparator(text.to_string()));
    };
    let h = digits(h, 1..=2).ok_or_else(|| TimeError::NotANumber(text.to_string()))?;
    let m = digits(m, 2..=2).ok_or_else(|| TimeError::NotANumber(text.to_string()))?;
    if m >= 60 {
        return Err(TimeError::MinuteOutOfRange(text.to_string()));
    }
    Ok(h * 60 + m)
}

fn digits(part: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&part.len()) || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

// Minutes since midnight -> "HH:mm". 1440 comes out as "24:00".
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// Local wall clock with the current system offset.
pub fn now_local() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Half-open range of minutes `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    pub start: u32,
    pub end: u32,
}

impl TimeSpan {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span {start}..{end} runs backwards");
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: TimeSpan) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_and_padded_times() {
        assert_eq!(parse_hhmm("00:00"), Ok(0));
        assert_eq!(parse_hhmm("09:15"), Ok(555));
        assert_eq!(parse_hhmm("9:05"), Ok(545));
        assert_eq!(parse_hhmm("23:59"), Ok(1439));
        assert_eq!(parse_hhmm("24:00"), Ok(DAY_MINUTES));
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(
            parse_hhmm("0930"),
            Err(TimeError::MissingSeparator("0930".to_string()))
        );
        assert_eq!(parse_hhmm(""), Err(TimeError::MissingSeparator(String::new())));
        assert_eq!(
            parse_hhmm("ab:30"),
            Err(TimeError::NotANumber("ab:30".to_string()))
        );
        assert_eq!(
            parse_hhmm("10:"),
            Err(TimeError::NotANumber("10:".to_string()))
        );
        assert_eq!(
            parse_hhmm("10:00:00"),
            Err(TimeError::NotANumber("10:00:00".to_string()))
        );
        assert_eq!(
            parse_hhmm("-1:00"),
            Err(TimeError::NotANumber("-1:00".to_string()))
        );
        for padded in ["+9:+5", " 9:05", "9 : 05", "09:5", "009:00", "9:050"] {
            assert_eq!(
                parse_hhmm(padded),
                Err(TimeError::NotANumber(padded.to_string())),
                "{padded:?} should be rejected"
            );
        }
        assert_eq!(
            parse_hhmm("10:75"),
            Err(TimeError::MinuteOutOfRange("10:75".to_string()))
        );
    }

    #[test]
    fn out_of_day_hours_still_parse() {
        assert_eq!(parse_hhmm("25:00"), Ok(1500));
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(65), "01:05");
        assert_eq!(format_hhmm(1439), "23:59");
        assert_eq!(format_hhmm(DAY_MINUTES), "24:00");
    }

    #[test]
    fn span_containment_and_overlap() {
        let outer = TimeSpan::new(540, 720);
        assert!(outer.contains(TimeSpan::new(555, 585)));
        assert!(outer.contains(outer));
        assert!(!outer.contains(TimeSpan::new(530, 600)));
        assert!(outer.overlaps(TimeSpan::new(530, 600)));
        assert!(!outer.overlaps(TimeSpan::new(720, 800)));
        assert!(TimeSpan::new(30, 30).is_empty());
        assert_eq!(TimeSpan::new(0, DAY_MINUTES).len(), 1440);
    }

    proptest! {
        #[test]
        fn every_minute_of_the_day_round_trips(m in 0u32..DAY_MINUTES) {
            prop_assert_eq!(parse_hhmm(&format_hhmm(m)), Ok(m));
        }
    }
}
