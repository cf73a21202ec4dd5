//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, TimeZone};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::error::ConfigError;

/// Parse a locale name such as `pt_BR` or `pt-BR`
pub fn parse_locale(name: &str) -> Result<Locale, ConfigError> {
    let normalized = name.replace('-', "_");
    Locale::try_from(normalized.as_str()).map_err(|_| ConfigError::UnknownLocale(name.to_string()))
}

/// Parse an IANA timezone name such as `America/Sao_Paulo`
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Parse a publication timestamp as sent by the content API
///
/// The API uses `2020-04-19T15:30:00+0000`; RFC 3339 is accepted as well.
pub fn parse_api_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// A publication date ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayDate {
    /// Formatted date plus its machine-readable form for `<time datetime>`
    Known { text: String, datetime: String },
    /// The document has no publication date
    Unknown,
}

impl DisplayDate {
    /// Text to show, using `unknown` when no date is available
    pub fn text<'a>(&'a self, unknown: &'a str) -> &'a str {
        match self {
            DisplayDate::Known { text, .. } => text,
            DisplayDate::Unknown => unknown,
        }
    }

    /// Value for a `datetime` attribute, if any
    pub fn datetime(&self) -> Option<&str> {
        match self {
            DisplayDate::Known { datetime, .. } => Some(datetime),
            DisplayDate::Unknown => None,
        }
    }
}

/// Formats publication dates with a fixed locale, timezone and pattern
///
/// Both the listing and the post pages go through the same formatter so a
/// date always reads the same everywhere.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    locale: Locale,
    timezone: Tz,
    format: String,
}

impl DateFormatter {
    /// Create a formatter from a locale name, timezone name and chrono pattern
    pub fn new(locale: &str, timezone: &str, format: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            locale: parse_locale(locale)?,
            timezone: parse_timezone(timezone)?,
            format: format.to_string(),
        })
    }

    /// Create a formatter from the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Self::new(&config.locale, &config.timezone, &config.date_format)
    }

    /// Format an optional publication date
    pub fn display(&self, date: Option<&DateTime<FixedOffset>>) -> DisplayDate {
        match date {
            Some(date) => {
                let local = date.with_timezone(&self.timezone);
                DisplayDate::Known {
                    text: local.format_localized(&self.format, self.locale).to_string(),
                    datetime: date_xml(&local),
                }
            }
            None => DisplayDate::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_br() -> DateFormatter {
        DateFormatter::new("pt_BR", "UTC", "%d %b %Y").unwrap()
    }

    #[test]
    fn test_parse_api_timestamp() {
        let date = parse_api_timestamp("2020-04-19T15:30:00+0000").unwrap();
        assert_eq!(date_xml(&date), "2020-04-19T15:30:00+00:00");

        let date = parse_api_timestamp("2020-04-19T15:30:00-03:00").unwrap();
        assert_eq!(date_xml(&date), "2020-04-19T15:30:00-03:00");

        assert!(parse_api_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_display_pt_br() {
        let date = parse_api_timestamp("2020-04-19T15:30:00+0000").unwrap();
        let display = pt_br().display(Some(&date));
        assert_eq!(display.text("?"), "19 abr 2020");
        assert_eq!(display.datetime(), Some("2020-04-19T15:30:00+00:00"));
    }

    #[test]
    fn test_display_pads_day() {
        let date = parse_api_timestamp("2021-03-05T10:00:00+0000").unwrap();
        assert_eq!(pt_br().display(Some(&date)).text("?"), "05 mar 2021");
    }

    #[test]
    fn test_display_uses_timezone() {
        let date = parse_api_timestamp("2020-04-19T01:00:00+0000").unwrap();
        let formatter = DateFormatter::new("pt-BR", "America/Sao_Paulo", "%d %b %Y").unwrap();
        assert_eq!(formatter.display(Some(&date)).text("?"), "18 abr 2020");
    }

    #[test]
    fn test_display_unknown() {
        let display = pt_br().display(None);
        assert_eq!(display, DisplayDate::Unknown);
        assert_eq!(display.text("Data desconhecida"), "Data desconhecida");
        assert_eq!(display.datetime(), None);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(DateFormatter::new("nope", "UTC", "%d").is_err());
        assert!(DateFormatter::new("pt_BR", "Nowhere/City", "%d").is_err());
    }
}
