use std::env;

use anyhow::Context;

/// Settings taken from the environment; command-line flags override them
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `tracing` filter directives
    pub log_filter: String,
    /// Sheet `insert` writes to when `--sheet` is not given
    pub default_sheet: Option<String>,
    /// Recognize ISO dates in payload strings
    pub parse_dates: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_filter = lookup("FLASHSHEET_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let default_sheet = lookup("FLASHSHEET_SHEET").filter(|s| !s.trim().is_empty());
        let parse_dates = match lookup("FLASHSHEET_PARSE_DATES") {
            Some(raw) => raw.trim().parse::<bool>().with_context(|| {
                format!("FLASHSHEET_PARSE_DATES must be true or false, got {raw:?}")
            })?,
            None => false,
        };

        Ok(Self {
            log_filter,
            default_sheet,
            parse_dates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.default_sheet, None);
        assert!(!config.parse_dates);
    }

    #[test]
    fn test_log_filter_precedence() {
        assert_eq!(config(&[("RUST_LOG", "warn")]).unwrap().log_filter, "warn");
        assert_eq!(
            config(&[("RUST_LOG", "warn"), ("FLASHSHEET_LOG", "flashsheet_preserve=debug")])
                .unwrap()
                .log_filter,
            "flashsheet_preserve=debug"
        );
    }

    #[test]
    fn test_sheet_and_dates() {
        let loaded = config(&[("FLASHSHEET_SHEET", "Reporte"), ("FLASHSHEET_PARSE_DATES", "true")])
            .unwrap();
        assert_eq!(loaded.default_sheet.as_deref(), Some("Reporte"));
        assert!(loaded.parse_dates);

        assert!(config(&[("FLASHSHEET_PARSE_DATES", "yes")]).is_err());
    }
}
