use serde::Deserialize;

use crate::core::DATE_WINDOW_DAYS;

/// Name of the optional configuration file (any format `config` understands).
pub const CONFIG_FILE: &str = "factura";
/// Prefix of environment overrides, e.g. `FACTURA__DEFAULT_SALES_POINT=3`.
pub const ENV_PREFIX: &str = "FACTURA";

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoicingConfig {
    /// Sales point used when a request does not name one.
    #[serde(default = "default_sales_point")]
    pub default_sales_point: u32,
    /// Allowed distance in days between the voucher date and today.
    #[serde(default = "default_date_window_days")]
    pub date_window_days: i64,
    /// Ask the authority for the full reply (result, number, observations).
    #[serde(default = "default_return_full")]
    pub return_full_reply: bool,
}

fn default_sales_point() -> u32 {
    1
}

fn default_date_window_days() -> i64 {
    DATE_WINDOW_DAYS
}

fn default_return_full() -> bool {
    true
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            default_sales_point: default_sales_point(),
            date_window_days: default_date_window_days(),
            return_full_reply: default_return_full(),
        }
    }
}

impl InvoicingConfig {
    pub fn with_default_sales_point(mut self, sales_point: u32) -> Self {
        self.default_sales_point = sales_point;
        self
    }

    pub fn with_date_window_days(mut self, days: i64) -> Self {
        self.date_window_days = days;
        self
    }

    pub fn with_return_full_reply(mut self, full: bool) -> Self {
        self.return_full_reply = full;
        self
    }

    /// Load from `factura.{toml,yaml,json,..}` in the working directory, if
    /// present, then apply `FACTURA__*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Like [`load`](Self::load) with an explicit file name (extension optional).
    pub fn load_from(name: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = InvoicingConfig::default();
        assert_eq!(config.default_sales_point, 1);
        assert_eq!(config.date_window_days, 10);
        assert!(config.return_full_reply);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = InvoicingConfig::load_from("does-not-exist/factura-test").unwrap();
        assert_eq!(config, InvoicingConfig::default());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: InvoicingConfig =
            serde_json::from_str(r#"{"default_sales_point": 4}"#).unwrap();
        assert_eq!(config.default_sales_point, 4);
        assert_eq!(config.date_window_days, 10);
    }
}
