//! Timezone literal validation
//!
//! Timezones are spliced into SQL as string literals, so only IANA zone names
//! known to `chrono-tz` and fixed `±HH:MM` offsets are accepted.

use crate::filter::ValidationError;
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-](0\d|1[0-4]):[0-5]\d$").expect("offset pattern is valid")
    })
}

/// Accept an IANA zone name or a `±HH:MM` offset
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.parse::<Tz>().is_ok() || offset_pattern().is_match(timezone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimezone {
            timezone: timezone.to_string(),
        })
    }
}
