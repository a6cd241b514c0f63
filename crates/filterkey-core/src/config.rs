//! Codec configuration.

use chrono::Datelike;

use crate::error::{Error, Result};

/// Default data region prefix for filter parameters.
pub const DEFAULT_REGION_NAME: &str = "query";

/// Default two-digit-year window in years.
pub const DEFAULT_TWO_DIGIT_YEAR_WINDOW: i32 = 80;

/// Settings shared by validation and parameter encoding.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Data region prefix used in parameter names (`<region>.<column>~<suffix>`).
    pub region_name: String,

    /// Year treated as "now" by the two-digit year heuristic. None uses the local clock.
    pub reference_year: Option<i32>,

    /// Short-year dates landing more than this many years before the
    /// reference year are moved forward a century.
    pub two_digit_year_window: i32,
}

impl CodecConfig {
    /// Create a configuration for the given data region.
    pub fn new(region_name: impl Into<String>) -> Self {
        Self {
            region_name: region_name.into(),
            reference_year: None,
            two_digit_year_window: DEFAULT_TWO_DIGIT_YEAR_WINDOW,
        }
    }

    /// Pin the reference year.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Set the two-digit year window.
    pub fn with_two_digit_year_window(mut self, years: i32) -> Self {
        self.two_digit_year_window = years;
        self
    }

    /// The year the two-digit heuristic compares against.
    pub fn current_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Check that the configuration can produce well-formed parameter names.
    pub fn validate(&self) -> Result<()> {
        if self.region_name.is_empty() {
            return Err(Error::Config("region name must not be empty".to_string()));
        }
        if self.region_name.contains(['.', '~']) {
            return Err(Error::Config(format!(
                "region name '{}' must not contain '.' or '~'",
                self.region_name
            )));
        }
        if self.two_digit_year_window < 0 {
            return Err(Error::Config(
                "two digit year window must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.region_name, "query");
        assert_eq!(config.two_digit_year_window, 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reject_bad_region() {
        assert!(CodecConfig::new("").validate().is_err());
        assert!(CodecConfig::new("a.b").validate().is_err());
        assert!(CodecConfig::new("a~b").validate().is_err());
    }

    #[test]
    fn test_reference_year_override() {
        let config = CodecConfig::default().with_reference_year(2001);
        assert_eq!(config.current_year(), 2001);
    }
}
