use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// penny:
///   max_price: 100
///   max_market_cap: 5000000000
///   min_promoter_holding: 50
/// export:
///   suffix: " (s)"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub penny: PennyCriteria,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Thresholds that flag an instrument as a penny stock.
///
/// All three must hold: price and market cap strictly below their maxima,
/// promoter holding strictly above its minimum.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PennyCriteria {
    /// Maximum share price (default: 100)
    pub max_price: f64,

    /// Maximum market cap in currency units (default: 500 crore = 5e9)
    pub max_market_cap: f64,

    /// Minimum promoter holding in percentage points (default: 50)
    pub min_promoter_holding: f64,
}

impl Default for PennyCriteria {
    fn default() -> Self {
        Self {
            max_price: 100.0,
            max_market_cap: 500.0 * 1e7,
            min_promoter_holding: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Appended to factor names so breakdown columns don't clash with raw
    /// metric columns in exported rows.
    pub suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            suffix: " (s)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.penny.max_price, 100.0);
        assert_eq!(config.penny.max_market_cap, 5e9);
        assert_eq!(config.penny.min_promoter_holding, 50.0);
        assert_eq!(config.export.suffix, " (s)");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_penny_config_parse() {
        let yaml = r#"
penny:
  max_price: 2200
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.penny.max_price, 2200.0);
        assert_eq!(config.penny.max_market_cap, 5e9);
        assert_eq!(config.penny.min_promoter_holding, 50.0);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
penny:
  max_price: 2200
  max_market_cap: 105000000000
  min_promoter_holding: 20
export:
  suffix: "_score"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.penny.max_market_cap, 105e9);
        assert_eq!(config.penny.min_promoter_holding, 20.0);
        assert_eq!(config.export.suffix, "_score");
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
penny:
  max_pe: 10
"#;
        let result: Result<Config, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
