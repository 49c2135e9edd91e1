use crate::error::{Result, SolvencyError};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Four-digit row identifier of the Russian balance sheet (form 1) and income
/// statement (form 2).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineItemCode(String);

impl LineItemCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(SolvencyError::InvalidLineItemCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LineItemCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LineItemCode {
    type Error = SolvencyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LineItemCode> for String {
    fn from(code: LineItemCode) -> Self {
        code.0
    }
}

impl JsonSchema for LineItemCode {
    fn schema_name() -> String {
        "LineItemCode".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some("^[0-9]{4}$".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

const DEFAULT_CODES: &[(&str, &str)] = &[
    // Balance sheet, assets
    ("1100", "Total non-current assets (section I)"),
    ("1150", "Fixed assets"),
    ("1170", "Long-term financial investments"),
    ("1200", "Total current assets (section II)"),
    ("1210", "Inventories"),
    ("1230", "Accounts receivable"),
    ("1240", "Short-term financial investments"),
    ("1250", "Cash and cash equivalents"),
    ("1600", "Balance sheet total (assets)"),
    // Balance sheet, liabilities and equity
    ("1300", "Total capital and reserves (equity)"),
    ("1400", "Total long-term liabilities (section IV)"),
    ("1500", "Total short-term liabilities (section V)"),
    ("1530", "Deferred income (short-term)"),
    ("1540", "Estimated liabilities (short-term)"),
    ("1550", "Other short-term liabilities"),
    ("1700", "Balance sheet total (liabilities and equity)"),
    // Income statement
    ("2110", "Revenue"),
    ("2120", "Cost of sales"),
    ("2200", "Profit (loss) from sales"),
    ("2220", "Administrative expenses"),
    ("2300", "Profit (loss) before tax"),
    ("2330", "Interest payable"),
    ("2400", "Net profit (loss) for the reporting period"),
];

/// The closed set of line item codes the extractor is allowed to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CodeRegistry {
    codes: BTreeMap<LineItemCode, String>,
}

impl CodeRegistry {
    pub fn from_entries<I, C, D>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, D)>,
        C: AsRef<str>,
        D: Into<String>,
    {
        let mut codes = BTreeMap::new();
        for (code, description) in entries {
            codes.insert(LineItemCode::parse(code.as_ref())?, description.into());
        }

        if codes.is_empty() {
            return Err(SolvencyError::InvalidConfig(
                "code registry must contain at least one code".to_string(),
            ));
        }

        Ok(Self { codes })
    }

    /// Returns the registered code for a raw cell, or `None` when the trimmed text
    /// is not an exact registry member.
    pub fn resolve(&self, raw: &str) -> Option<LineItemCode> {
        self.codes
            .get_key_value(raw.trim())
            .map(|(code, _)| code.clone())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    pub fn description(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &LineItemCode> {
        self.codes.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&LineItemCode, &str)> {
        self.codes.iter().map(|(code, desc)| (code, desc.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        let codes = DEFAULT_CODES
            .iter()
            .map(|(code, desc)| (LineItemCode((*code).to_string()), (*desc).to_string()))
            .collect();
        Self { codes }
    }
}
