use crate::engine::ratio_description;
use crate::error::Result;
use crate::registry::CodeRegistry;
use crate::schema::AnalysisResult;
use serde::{Deserialize, Serialize};

const ABSENT: &str = "—";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a financial analyst. Answer briefly and in a structured way, in Russian.";

const QUESTION_SYSTEM_PROMPT: &str = "You are a financial analyst. Answer in Russian.";

/// System and user messages for an external summarization model. Building the
/// messages is all this crate does; sending them is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPrompt {
    pub system: String,
    pub user: String,
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{}", v))
}

/// Renders an [`AnalysisResult`] for people. Codes are labelled from the registry
/// the result was extracted with.
pub struct ReportAssembler<'a> {
    registry: &'a CodeRegistry,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(registry: &'a CodeRegistry) -> Self {
        Self { registry }
    }

    pub fn to_text(&self, result: &AnalysisResult, document_name: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Document: {}\n\n", document_name));

        output.push_str("=== Statement line items (balance sheet and income statement) ===\n");
        for (code, description) in self.registry.entries() {
            let value = result.codes.get(code).copied().unwrap_or_default();
            output.push_str(&format!(
                "Code {}: {}\n  Current period: {}\n  Previous period: {}\n",
                code,
                description,
                fmt_value(value.current),
                fmt_value(value.previous)
            ));
        }

        output.push_str("\n=== Financial stability ratios (levels) ===\n");
        for (name, value) in &result.levels {
            output.push_str(&format!(
                "{}: {}  # {}\n",
                name,
                value,
                ratio_description(name).unwrap_or("")
            ));
        }

        output.push_str("\n=== Key indicator dynamics (growth rate) ===\n");
        output.push_str("Growth is computed as (current / previous - 1), in fractions.\n");
        for (key, value) in &result.growth {
            let code = key.trim_start_matches("growth_");
            output.push_str(&format!(
                "{}: {}  # {} - {}\n",
                key,
                value,
                code,
                self.registry.description(code).unwrap_or("")
            ));
        }

        output.push_str("\n=== Financial stability index ===\n");
        output.push_str(&format!("FSI (0..1): {}\n", fmt_value(result.index.fsi)));
        if let Some(risk) = result.risk_level() {
            output.push_str(&format!("Risk level: {}\n", risk.label()));
        }
        output.push_str("\nRatio scores (0..1):\n");
        for (name, score) in &result.index.scores {
            output.push_str(&format!(
                "{}: {}  # {}\n",
                name,
                score,
                ratio_description(name).unwrap_or("")
            ));
        }

        output
    }

    pub fn to_markdown(&self, result: &AnalysisResult, document_name: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Financial Stability Report - {}\n\n", document_name));
        output.push_str(&format!("**FSI:** {}", fmt_value(result.index.fsi)));
        if let Some(risk) = result.risk_level() {
            output.push_str(&format!(" ({} risk)", risk.label()));
        }
        output.push_str("\n\n");

        output.push_str("## Line Items\n\n");
        output.push_str("| Code | Description | Current | Previous |\n");
        output.push_str("|---|---|---:|---:|\n");
        for (code, value) in &result.codes {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                code,
                self.registry.description(code.as_str()).unwrap_or(""),
                fmt_value(value.current),
                fmt_value(value.previous)
            ));
        }
        output.push('\n');

        output.push_str("## Ratios\n\n");
        output.push_str("| Ratio | Level | Score | Formula |\n");
        output.push_str("|---|---:|---:|---|\n");
        for (name, level) in &result.levels {
            output.push_str(&format!(
                "| {} | {:.4} | {} | {} |\n",
                name,
                level,
                result
                    .index
                    .scores
                    .get(name)
                    .map_or_else(|| ABSENT.to_string(), |s| format!("{:.2}", s)),
                ratio_description(name).unwrap_or("")
            ));
        }
        output.push('\n');

        output.push_str("## Growth\n\n");
        if result.growth.is_empty() {
            output.push_str("_No line item has both periods._\n");
        } else {
            for (key, value) in &result.growth {
                output.push_str(&format!("- {}: {:+.2}%\n", key, value * 100.0));
            }
        }
        output.push('\n');

        output
    }

    pub fn to_json(&self, result: &AnalysisResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }

    pub fn summary_prompt(report_text: &str) -> SummaryPrompt {
        SummaryPrompt {
            system: SUMMARY_SYSTEM_PROMPT.to_string(),
            user: format!(
                "Give a short conclusion on the company's financial stability based on the \
                 following report: rate the risk level (low/moderate/high) and name the key \
                 strengths and weaknesses.\n\n{}",
                report_text
            ),
        }
    }

    pub fn question_prompt(report_text: &str, question: &str) -> SummaryPrompt {
        SummaryPrompt {
            system: QUESTION_SYSTEM_PROMPT.to_string(),
            user: format!(
                "Answer the question using the following financial stability report.\n\n\
                 REPORT:\n{}\n\nQUESTION: {}",
                report_text, question
            ),
        }
    }
}
