//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats instants for display in a fixed locale and timezone
#[derive(Debug, Clone)]
pub struct DateFormatter {
    date_format: String,
    time_format: String,
    locale: Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter from Moment.js-style formats, a locale ("pt_BR") and
    /// an IANA timezone ("America/Sao_Paulo")
    pub fn new(date_format: &str, time_format: &str, locale: &str, timezone: &str) -> Result<Self> {
        let locale_name = locale.replace('-', "_");
        let locale = Locale::try_from(locale_name.as_str())
            .map_err(|_| anyhow!("Unknown locale: {}", locale))?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| anyhow!("Unknown timezone {}: {}", timezone, e))?;

        Ok(Self {
            date_format: moment_to_chrono_format(date_format),
            time_format: moment_to_chrono_format(time_format),
            locale,
            timezone,
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(
            &config.date_format,
            &config.time_format,
            &config.language,
            &config.timezone,
        )
    }

    /// Date portion, e.g. "15 Mar 2022"
    pub fn date(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format_localized(&self.date_format, self.locale)
            .to_string()
    }

    /// Time portion, e.g. "14:05"
    pub fn time(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format_localized(&self.time_format, self.locale)
            .to_string()
    }

    /// Date of an optional instant; empty when absent
    pub fn optional_date(&self, instant: Option<&DateTime<Utc>>) -> String {
        instant.map(|i| self.date(i)).unwrap_or_default()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            date_format: moment_to_chrono_format("DD MMM YYYY"),
            time_format: moment_to_chrono_format("HH:mm"),
            locale: Locale::en_US,
            timezone: Tz::UTC,
        }
    }
}

/// Format an instant in ISO 8601, for `<time datetime="...">`
pub fn date_xml(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each group so "MMM" is not eaten by "MM"
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DD", "%d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute, after "MM"
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_and_time() {
        let formatter = DateFormatter::default();
        let midnight = Utc.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2022, 3, 15, 14, 5, 0).unwrap();
        assert_eq!(formatter.date(&midnight), "15 Mar 2022");
        assert_eq!(formatter.time(&afternoon), "14:05");
    }

    #[test]
    fn test_locale_month_names() {
        let formatter = DateFormatter::new("DD MMM YYYY", "HH:mm", "pt-BR", "UTC").unwrap();
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap();
        assert_eq!(formatter.date(&date), "15 mar 2021");
    }

    #[test]
    fn test_timezone_shift() {
        let formatter =
            DateFormatter::new("DD MMM YYYY", "HH:mm", "en_US", "America/Sao_Paulo").unwrap();
        let date = Utc.with_ymd_and_hms(2022, 3, 15, 1, 30, 0).unwrap();
        assert_eq!(formatter.date(&date), "14 Mar 2022");
        assert_eq!(formatter.time(&date), "22:30");
    }

    #[test]
    fn test_invalid_settings() {
        assert!(DateFormatter::new("DD", "HH", "xx_XX", "UTC").is_err());
        assert!(DateFormatter::new("DD", "HH", "en_US", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_optional_date() {
        let formatter = DateFormatter::default();
        assert_eq!(formatter.optional_date(None), "");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("DD MMM YYYY"), "%d %b %Y");
        assert_eq!(moment_to_chrono_format("HH:mm"), "%H:%M");
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
    }
}
