use bstr::{BStr, BString, ByteSlice};
use chrono::Local;

use crate::error::UtilError;
use crate::Result;

/// When something happened: epoch seconds plus the writer's UTC offset.
///
/// The offset is informational (it records the writer's wall clock); the
/// timestamp alone orders events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitDate {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Writer's offset from UTC, in minutes.
    pub tz_offset: i32,
}

/// Offsets travel as a signed four-digit decimal (`-0530` reads as the
/// integer -530). Since Rust's division and remainder both keep the sign,
/// the hour/minute split needs no special casing.
fn tz_to_minutes(tz: i32) -> i32 {
    (tz / 100) * 60 + tz % 100
}

fn minutes_to_tz(minutes: i32) -> i32 {
    (minutes / 60) * 100 + minutes % 60
}

impl GitDate {
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// Decode the on-disk form: `"<epoch-seconds> <±HHMM>"`, offset
    /// optional.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let (stamp, zone) = match input.split_once(' ') {
            Some((stamp, zone)) => (stamp, Some(zone.trim())),
            None => (input, None),
        };

        let timestamp = stamp
            .parse()
            .map_err(|_| UtilError::DateParse(format!("bad epoch seconds: '{}'", stamp)))?;

        let tz_offset = match zone {
            None => 0,
            Some(zone) => {
                let raw: i32 = zone.parse().map_err(|_| {
                    UtilError::DateParse(format!("bad timezone field: '{}'", zone))
                })?;
                tz_to_minutes(raw)
            }
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    /// Encode in the on-disk form: `"1234567890 +0000"`.
    pub fn format_raw(&self) -> String {
        let tz = minutes_to_tz(self.tz_offset);
        let sign = if tz < 0 { '-' } else { '+' };
        format!("{} {}{:04}", self.timestamp, sign, tz.abs())
    }
}

/// The wall clock the resolver consults for relative date expressions
/// (`@{2 days ago}`) and for the local timezone of bare dates.
///
/// `Fixed` pins both so resolution is reproducible in tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Real time; timezone from `TZ` (only `UTC` is recognized) or the
    /// system locale.
    System,
    /// A pinned instant and timezone offset in minutes.
    Fixed { now: i64, tz_offset: i32 },
}

impl Clock {
    /// Current time in seconds since the Unix epoch.
    pub fn now(&self) -> i64 {
        match self {
            Clock::System => chrono::Utc::now().timestamp(),
            Clock::Fixed { now, .. } => *now,
        }
    }

    /// Local timezone offset in minutes from UTC.
    pub fn tz_offset_minutes(&self) -> i32 {
        match self {
            Clock::System => match std::env::var("TZ") {
                Ok(tz) if tz == "UTC" || tz == "UTC0" => 0,
                _ => Local::now().offset().local_minus_utc() / 60,
            },
            Clock::Fixed { tz_offset, .. } => *tz_offset,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}

/// Who wrote an object or moved a ref: `Name <email> epoch ±HHMM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: GitDate,
}

impl Signature {
    /// Decode an identity line. The email is delimited by the first
    /// `<`…`>` pair; the date follows it.
    pub fn parse(input: &BStr) -> Result<Self> {
        let bytes = input.as_bytes();

        let open = bytes
            .find_byte(b'<')
            .ok_or_else(|| UtilError::DateParse("identity has no '<'".into()))?;
        let close = bytes[open..]
            .find_byte(b'>')
            .map(|p| p + open)
            .ok_or_else(|| UtilError::DateParse("identity has no '>'".into()))?;

        let stamp = std::str::from_utf8(bytes[close + 1..].trim())
            .map_err(|_| UtilError::DateParse("identity timestamp is not UTF-8".into()))?;

        Ok(Self {
            name: BString::from(bytes[..open].trim()),
            email: BString::from(&bytes[open + 1..close]),
            date: GitDate::parse_raw(stamp)?,
        })
    }

    /// Encode in the canonical identity form. Byte-based so non-UTF-8
    /// names survive unchanged.
    pub fn to_bytes(&self) -> BString {
        let mut out = Vec::with_capacity(self.name.len() + self.email.len() + 24);
        out.extend_from_slice(&self.name);
        out.extend_from_slice(b" <");
        out.extend_from_slice(&self.email);
        out.extend_from_slice(b"> ");
        out.extend_from_slice(self.date.format_raw().as_bytes());
        BString::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_with_utc_offset() {
        let d = GitDate::parse_raw("1700000000 +0000").unwrap();
        assert_eq!((d.timestamp, d.tz_offset), (1700000000, 0));
    }

    #[test]
    fn raw_with_half_hour_offsets() {
        // Nepal: +0545. Marquesas: -0930.
        let east = GitDate::parse_raw("1700000000 +0545").unwrap();
        assert_eq!(east.tz_offset, 5 * 60 + 45);

        let west = GitDate::parse_raw("1700000000 -0930").unwrap();
        assert_eq!(west.tz_offset, -(9 * 60 + 30));
    }

    #[test]
    fn raw_without_offset_reads_as_utc() {
        assert_eq!(GitDate::parse_raw("1700000000").unwrap().tz_offset, 0);
    }

    #[test]
    fn raw_rejects_garbage() {
        assert!(GitDate::parse_raw("soon").is_err());
        assert!(GitDate::parse_raw("1700000000 over there").is_err());
        assert!(GitDate::parse_raw("").is_err());
    }

    #[test]
    fn format_raw_shapes() {
        assert_eq!(GitDate::new(1700000000, 0).format_raw(), "1700000000 +0000");
        assert_eq!(
            GitDate::new(1700000000, -570).format_raw(),
            "1700000000 -0930"
        );
        assert_eq!(GitDate::new(1700000000, 345).format_raw(), "1700000000 +0545");
    }

    #[test]
    fn raw_roundtrip() {
        for tz in [-720, -570, -300, 0, 60, 345, 780] {
            let d = GitDate::new(1700000000, tz);
            let back = GitDate::parse_raw(&d.format_raw()).unwrap();
            assert_eq!(back, d);
        }
    }

    #[test]
    fn fixed_clock() {
        let clock = Clock::Fixed {
            now: 1335806700,
            tz_offset: -480,
        };
        assert_eq!(clock.now(), 1335806700);
        assert_eq!(clock.tz_offset_minutes(), -480);
    }

    #[test]
    fn system_clock_advances() {
        // Sanity: some time after 2020-01-01.
        assert!(Clock::System.now() > 1_577_836_800);
    }

    #[test]
    fn identity_decodes() {
        let sig =
            Signature::parse(BStr::new(b"Rae Resolver <rae@example.org> 1700000000 -0300"))
                .unwrap();
        assert_eq!(sig.name, BString::from("Rae Resolver"));
        assert_eq!(sig.email, BString::from("rae@example.org"));
        assert_eq!(sig.date.timestamp, 1700000000);
        assert_eq!(sig.date.tz_offset, -180);
    }

    #[test]
    fn identity_roundtrip() {
        let sig = Signature {
            name: BString::from("No One"),
            email: BString::from("nobody@example.org"),
            date: GitDate::new(1700000000, 345),
        };
        assert_eq!(
            sig.to_bytes(),
            BString::from("No One <nobody@example.org> 1700000000 +0545")
        );
        assert_eq!(Signature::parse(sig.to_bytes().as_bstr()).unwrap(), sig);
    }

    #[test]
    fn identity_with_empty_name() {
        let sig = Signature::parse(BStr::new(b"<ghost@example.org> 1 +0000")).unwrap();
        assert!(sig.name.is_empty());
        assert_eq!(sig.email, BString::from("ghost@example.org"));
    }

    #[test]
    fn identity_requires_brackets() {
        assert!(Signature::parse(BStr::new(b"nobody at all 1 +0000")).is_err());
        assert!(Signature::parse(BStr::new(b"x <unclosed 1 +0000")).is_err());
    }
}
