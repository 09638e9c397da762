//! Validity-period conversions.
//!
//! SMPP encodes validity as a 16-character time string: the absolute form
//! `YYMMDDhhmmsstnnp` (p is `+` or `-`, nn counts quarter hours from UTC)
//! or the relative form ending in `R` with t and nn zeroed. Durations are
//! signed: an absolute stamp in the past converts to a negative duration.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("bad validity period format")]
pub struct BadFormat;

/// Render a validity duration as the absolute SMPP form relative to
/// `local_time`. A zero duration renders as the empty string (immediate /
/// SMSC default).
pub fn to_smpp_validity_period(local_time: DateTime<Utc>, period: Duration) -> String {
    if period.is_zero() {
        return String::new();
    }

    format!("{}000+", (local_time + period).format("%y%m%d%H%M%S"))
}

/// Parse an SMPP validity-period string into a duration relative to
/// `local_time`. The empty string yields `default_period`.
pub fn from_smpp_validity_period(
    local_time: DateTime<Utc>,
    period: &str,
    default_period: Duration,
) -> Result<Duration, BadFormat> {
    if period.is_empty() {
        return Ok(default_period);
    }

    let bytes = period.as_bytes();
    if bytes.len() != 16 {
        return Err(BadFormat);
    }
    if !bytes[..15].iter().all(u8::is_ascii_digit) {
        return Err(BadFormat);
    }

    let digit = |i: usize| i64::from(bytes[i] - b'0');
    let pair = |i: usize| 10 * digit(i) + digit(i + 1);

    let tenths = digit(12);
    let quarter_hours = pair(13);

    match bytes[15] {
        sign @ (b'+' | b'-') => {
            if quarter_hours > 48 {
                return Err(BadFormat);
            }

            let stamp = NaiveDateTime::parse_from_str(&period[..12], "%y%m%d%H%M%S")
                .map_err(|_| BadFormat)?
                .and_utc();
            let offset = if sign == b'-' { -quarter_hours } else { quarter_hours };

            Ok(stamp + Duration::milliseconds(100 * tenths) + Duration::minutes(15 * offset)
                - local_time)
        }
        b'R' => {
            if tenths != 0 || quarter_hours != 0 {
                return Err(BadFormat);
            }
            // relative periods are day-grained at most
            if pair(0) != 0 || pair(2) != 0 {
                return Err(BadFormat);
            }

            Ok(Duration::days(pair(4))
                + Duration::hours(pair(6))
                + Duration::minutes(pair(8))
                + Duration::seconds(pair(10)))
        }
        _ => Err(BadFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn zero_period_renders_empty() {
        assert_eq!(
            to_smpp_validity_period(at(2020, 10, 24, 12, 6, 4), Duration::zero()),
            ""
        );
    }

    #[test]
    fn absolute_form_round_trips() {
        let now = at(2020, 10, 24, 12, 6, 4);
        let rendered = to_smpp_validity_period(now, Duration::hours(1));
        assert_eq!(rendered, "201024130604000+");
        assert_eq!(
            from_smpp_validity_period(now, &rendered, Duration::zero()),
            Ok(Duration::hours(1))
        );
    }

    #[test]
    fn empty_string_yields_default() {
        assert_eq!(
            from_smpp_validity_period(at(2020, 1, 1, 0, 0, 0), "", Duration::minutes(5)),
            Ok(Duration::minutes(5))
        );
    }

    #[test]
    fn negative_utc_offset_and_tenths_apply() {
        let now = at(2020, 10, 24, 12, 0, 0);
        // one hour ahead, minus four quarter hours, plus 0.5s
        assert_eq!(
            from_smpp_validity_period(now, "201024130000504-", Duration::zero()),
            Ok(Duration::milliseconds(500))
        );
    }

    #[test]
    fn past_stamp_is_negative() {
        let now = at(2020, 10, 24, 12, 0, 0);
        assert_eq!(
            from_smpp_validity_period(now, "201024110000000+", Duration::zero()),
            Ok(Duration::hours(-1))
        );
    }

    #[test]
    fn relative_form_sums_components() {
        let now = at(2020, 1, 1, 0, 0, 0);
        assert_eq!(
            from_smpp_validity_period(now, "000002080910000R", Duration::zero()),
            Ok(Duration::days(2)
                + Duration::hours(8)
                + Duration::minutes(9)
                + Duration::seconds(10))
        );
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let now = at(2020, 1, 1, 0, 0, 0);
        let zero = Duration::zero();
        // wrong length
        assert_eq!(from_smpp_validity_period(now, "201024", zero), Err(BadFormat));
        // non-digit in the numeric run
        assert_eq!(
            from_smpp_validity_period(now, "2010x4130604000+", zero),
            Err(BadFormat)
        );
        // offset beyond 48 quarter hours
        assert_eq!(
            from_smpp_validity_period(now, "201024130604049+", zero),
            Err(BadFormat)
        );
        // unknown trailing indicator
        assert_eq!(
            from_smpp_validity_period(now, "201024130604000Z", zero),
            Err(BadFormat)
        );
        // relative form with utc-offset digits set
        assert_eq!(
            from_smpp_validity_period(now, "000002000000100R", zero),
            Err(BadFormat)
        );
        // relative form with years or months
        assert_eq!(
            from_smpp_validity_period(now, "010002000000000R", zero),
            Err(BadFormat)
        );
    }
}
