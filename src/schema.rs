use crate::registry::LineItemCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodValue {
    #[schemars(description = "Figure for the reporting (current) period, if the document printed one")]
    pub current: Option<f64>,

    #[schemars(description = "Figure for the comparative (previous) period, if the document printed one")]
    pub previous: Option<f64>,
}

impl PeriodValue {
    pub fn new(current: Option<f64>, previous: Option<f64>) -> Self {
        Self { current, previous }
    }

    /// Overwrites each slot that `other` actually carries; absent slots leave the
    /// stored figure alone.
    pub fn merge(&mut self, other: PeriodValue) {
        if other.current.is_some() {
            self.current = other.current;
        }
        if other.previous.is_some() {
            self.previous = other.previous;
        }
    }
}

/// Extracted figures keyed by registry code.
pub type CodeValues = BTreeMap<LineItemCode, PeriodValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BandDirection {
    #[schemars(description = "Higher raw values score higher")]
    Ascending,

    #[schemars(description = "Lower raw values score higher")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBand {
    pub min: f64,
    pub max: f64,
    pub direction: BandDirection,
}

impl ScoreBand {
    pub const fn ascending(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            direction: BandDirection::Ascending,
        }
    }

    pub const fn descending(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            direction: BandDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioBand {
    #[schemars(description = "Name of the ratio level this band scores (e.g. 'currentratio')")]
    pub ratio: String,

    #[serde(flatten)]
    pub band: ScoreBand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioOutput {
    #[schemars(description = "Ratio levels that passed their domain guard, keyed by ratio name")]
    pub levels: BTreeMap<String, f64>,

    #[schemars(description = "Period-over-period growth keyed as 'growth_<code>'")]
    pub growth: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolvencyIndex {
    #[schemars(description = "Per-ratio sub-scores in [0, 1]; only ratios with a level appear")]
    pub scores: BTreeMap<String, f64>,

    #[schemars(description = "Mean of the present sub-scores, absent when no ratio could be scored")]
    pub fsi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_fsi(fsi: f64) -> Self {
        if fsi >= 0.7 {
            Self::Low
        } else if fsi >= 0.4 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub codes: CodeValues,
    pub levels: BTreeMap<String, f64>,
    pub growth: BTreeMap<String, f64>,
    pub index: SolvencyIndex,
}

impl AnalysisResult {
    pub fn fsi(&self) -> Option<f64> {
        self.index.fsi
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.index.fsi.map(RiskLevel::from_fsi)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisResult)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
