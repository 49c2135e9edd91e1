use crate::registry::CodeRegistry;
use crate::schema::{CodeValues, RatioOutput};
use crate::utils::growth_rate;
use log::debug;
use std::collections::BTreeMap;

/// A ratio expressed as `numerator / denominator` over current-period figures.
///
/// `operands` lists the codes the formula reads, in the order `formula` receives
/// them; `formula` indexes that slice, so it must not read past `operands.len()`.
/// The ratio is defined only when every operand is present, the denominator is
/// non-zero and the quotient is finite.
#[derive(Debug, Clone, Copy)]
pub struct RatioDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub operands: &'static [&'static str],
    pub formula: fn(&[f64]) -> (f64, f64),
}

impl RatioDefinition {
    pub fn evaluate(&self, codes: &CodeValues) -> Option<f64> {
        let values = self
            .operands
            .iter()
            .map(|code| codes.get(*code).and_then(|v| v.current))
            .collect::<Option<Vec<f64>>>()?;

        let (numerator, denominator) = (self.formula)(&values);
        if denominator == 0.0 {
            return None;
        }
        Some(numerator / denominator).filter(|v| v.is_finite())
    }
}

pub const RATIO_DEFINITIONS: &[RatioDefinition] = &[
    RatioDefinition {
        name: "currentratio",
        description: "Current liquidity ratio (1200 / (1500 - 1530))",
        operands: &["1200", "1500", "1530"],
        formula: |v| (v[0], v[1] - v[2]),
    },
    RatioDefinition {
        name: "quickratio",
        description: "Quick liquidity ratio ((1200 - 1210) / 1500)",
        operands: &["1200", "1210", "1500"],
        formula: |v| (v[0] - v[1], v[2]),
    },
    RatioDefinition {
        name: "koeffindep",
        description: "Autonomy (financial independence) ratio (1300 / 1600)",
        operands: &["1300", "1600"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "perccovratio",
        description: "Share of assets covered by equity and long-term liabilities ((1300 + 1400) / 1600)",
        operands: &["1300", "1400", "1600"],
        formula: |v| (v[0] + v[1], v[2]),
    },
    RatioDefinition {
        name: "equityratio",
        description: "Share of equity in permanent capital (1300 / (1300 + 1400))",
        operands: &["1300", "1400"],
        formula: |v| (v[0], v[0] + v[1]),
    },
    RatioDefinition {
        name: "finlevratio",
        description: "Financial leverage ratio ((1400 + 1500) / 1300)",
        operands: &["1300", "1400", "1500"],
        formula: |v| (v[1] + v[2], v[0]),
    },
    RatioDefinition {
        name: "maneuvcoef",
        description: "Equity maneuverability ratio ((1300 - 1100) / 1300)",
        operands: &["1300", "1100"],
        formula: |v| (v[0] - v[1], v[0]),
    },
    RatioDefinition {
        name: "constassetratio",
        description: "Share of non-current assets in total assets (1100 / 1600)",
        operands: &["1100", "1600"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "coefofownfunds",
        description: "Own working capital sufficiency ratio ((1300 - 1100) / 1200)",
        operands: &["1300", "1100", "1200"],
        formula: |v| (v[0] - v[1], v[2]),
    },
    RatioDefinition {
        name: "net_margin",
        description: "Net margin (2400 / 2110)",
        operands: &["2400", "2110"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "normofprib",
        description: "Net profit margin (2400 / 2110)",
        operands: &["2400", "2110"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "operating_margin",
        description: "Operating margin (2200 / 2110)",
        operands: &["2200", "2110"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "roe_like",
        description: "Return on assets, unaveraged (2400 / 1600)",
        operands: &["2400", "1600"],
        formula: |v| (v[0], v[1]),
    },
    RatioDefinition {
        name: "interest_coverage",
        description: "Interest coverage ((2300 + |2330|) / |2330|)",
        operands: &["2300", "2330"],
        formula: |v| (v[0] + v[1].abs(), v[1].abs()),
    },
];

pub fn ratio_definition(name: &str) -> Option<&'static RatioDefinition> {
    RATIO_DEFINITIONS.iter().find(|d| d.name == name)
}

pub fn ratio_description(name: &str) -> Option<&'static str> {
    ratio_definition(name).map(|d| d.description)
}

pub fn growth_key(code: &str) -> String {
    format!("growth_{}", code)
}

pub struct RatioEngine<'a> {
    registry: &'a CodeRegistry,
}

impl<'a> RatioEngine<'a> {
    pub fn new(registry: &'a CodeRegistry) -> Self {
        Self { registry }
    }

    pub fn compute(&self, codes: &CodeValues) -> RatioOutput {
        RatioOutput {
            levels: self.compute_levels(codes),
            growth: self.compute_growth(codes),
        }
    }

    pub fn compute_levels(&self, codes: &CodeValues) -> BTreeMap<String, f64> {
        let mut levels = BTreeMap::new();

        for definition in RATIO_DEFINITIONS {
            match definition.evaluate(codes) {
                Some(value) => {
                    levels.insert(definition.name.to_string(), value);
                }
                None => debug!(
                    "Ratio {} omitted: missing operand or zero denominator",
                    definition.name
                ),
            }
        }

        levels
    }

    /// Growth for every registry code that has both periods and a non-zero base.
    pub fn compute_growth(&self, codes: &CodeValues) -> BTreeMap<String, f64> {
        self.registry
            .codes()
            .filter_map(|code| {
                let value = codes.get(code)?;
                growth_rate(value.current, value.previous)
                    .map(|rate| (growth_key(code.as_str()), rate))
            })
            .collect()
    }
}
