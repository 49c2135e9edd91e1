use crate::error::{Result, SolvencyError};
use crate::registry::CodeRegistry;
use crate::schema::{RatioBand, ScoreBand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Tokens that mark a column header as the line-item code column. Matched as a
/// case-insensitive substring, so "Код строки" and "Code" both qualify.
pub const DEFAULT_CODE_HEADER_TOKENS: &[&str] = &["код", "code"];

pub fn default_score_bands() -> Vec<RatioBand> {
    let bands = [
        ("currentratio", ScoreBand::ascending(1.0, 2.5)),
        ("quickratio", ScoreBand::ascending(0.7, 1.5)),
        ("koeffindep", ScoreBand::ascending(0.3, 0.6)),
        ("perccovratio", ScoreBand::ascending(0.6, 0.9)),
        ("equityratio", ScoreBand::ascending(0.3, 0.7)),
        ("finlevratio", ScoreBand::descending(1.0, 3.0)),
        ("maneuvcoef", ScoreBand::ascending(0.0, 0.3)),
        ("constassetratio", ScoreBand::descending(0.6, 0.9)),
        ("coefofownfunds", ScoreBand::ascending(0.0, 0.3)),
        ("net_margin", ScoreBand::ascending(0.02, 0.2)),
    ];

    bands
        .into_iter()
        .map(|(ratio, band)| RatioBand {
            ratio: ratio.to_string(),
            band,
        })
        .collect()
}

fn default_code_header_tokens() -> Vec<String> {
    DEFAULT_CODE_HEADER_TOKENS
        .iter()
        .map(|t| t.to_string())
        .collect()
}

/// Read-only settings for one analysis run. Built once and shared by reference
/// across the extractor, the ratio engine and the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    #[serde(default)]
    #[schemars(description = "Closed registry of line item codes to extract, with descriptions")]
    pub registry: CodeRegistry,

    #[serde(default = "default_code_header_tokens")]
    #[schemars(
        description = "Case-insensitive substrings identifying the code column in a table header"
    )]
    pub code_header_tokens: Vec<String>,

    #[serde(default = "default_score_bands")]
    #[schemars(description = "Normalization band for every ratio that contributes to the index")]
    pub score_bands: Vec<RatioBand>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            registry: CodeRegistry::default(),
            code_header_tokens: default_code_header_tokens(),
            score_bands: default_score_bands(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry.is_empty() {
            return Err(SolvencyError::InvalidConfig(
                "code registry must contain at least one code".to_string(),
            ));
        }

        if self.code_header_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(SolvencyError::InvalidConfig(
                "at least one non-empty code header token is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.score_bands {
            let band = &entry.band;
            if !band.min.is_finite() || !band.max.is_finite() {
                return Err(SolvencyError::InvalidScoreBand {
                    ratio: entry.ratio.clone(),
                    details: format!("bounds must be finite (got [{}, {}])", band.min, band.max),
                });
            }
            if band.min >= band.max {
                return Err(SolvencyError::InvalidScoreBand {
                    ratio: entry.ratio.clone(),
                    details: format!("min {} must be below max {}", band.min, band.max),
                });
            }
            if !seen.insert(entry.ratio.as_str()) {
                return Err(SolvencyError::InvalidScoreBand {
                    ratio: entry.ratio.clone(),
                    details: "ratio has more than one band".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BandDirection;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.score_bands.len(), 10);
        assert_eq!(config.code_header_tokens, vec!["код", "code"]);

        let finlev = config
            .score_bands
            .iter()
            .find(|b| b.ratio == "finlevratio")
            .unwrap();
        assert_eq!(finlev.band.direction, BandDirection::Descending);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{"code_header_tokens": ["шифр"]}"#).unwrap();
        assert_eq!(config.code_header_tokens, vec!["шифр"]);
        assert_eq!(config.registry, CodeRegistry::default());
        assert_eq!(config.score_bands, default_score_bands());
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let json = r#"{"score_bands": [{"ratio": "currentratio", "min": 2.5, "max": 1.0, "direction": "ascending"}]}"#;
        let err = AnalysisConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, SolvencyError::InvalidScoreBand { ref ratio, .. } if ratio == "currentratio"));
    }

    #[test]
    fn test_duplicate_band_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.score_bands.push(RatioBand {
            ratio: "net_margin".to_string(),
            band: ScoreBand::ascending(0.0, 1.0),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_tokens_are_rejected() {
        let config = AnalysisConfig {
            code_header_tokens: vec!["  ".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SolvencyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AnalysisConfig::default();
        let json = config.to_json().unwrap();
        let back = AnalysisConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
