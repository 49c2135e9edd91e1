//! # Solvency Index
//!
//! A library for pulling coded line items out of converted Russian financial
//! statements (balance sheet and income statement) and turning them into
//! solvency, liquidity and profitability ratios plus one composite stability index.
//!
//! ## Core Concepts
//!
//! - **Line Item Codes**: Four-digit statement row codes (`1600`, `2110`, ...) from a closed registry
//! - **Period Values**: The current and previous period figure printed next to each code
//! - **Ratios**: Guarded formulas over current-period figures; a ratio that cannot be computed is absent, never zero
//! - **FSI**: The mean of the banded ratio scores that could be computed
//!
//! The document-to-markup conversion happens elsewhere. This crate starts from the
//! converted markdown (or from already-parsed tables) and never calls out to any
//! service.
//!
//! ## Example
//!
//! ```rust,ignore
//! use solvency_index::*;
//!
//! let tables = vec![RawTable::from_strs(
//!     Some(&["Наименование", "Код", "2023", "2022"]),
//!     &[
//!         &["Итого оборотные активы", "1200", "200", "180"],
//!         &["Итого краткосрочные обязательства", "1500", "150", "160"],
//!         &["Доходы будущих периодов", "1530", "50", "40"],
//!     ],
//! )];
//!
//! let result = analyze_tables(&tables);
//! assert_eq!(result.levels["currentratio"], 2.0);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod markup;
pub mod registry;
pub mod report;
pub mod schema;
pub mod scoring;
pub mod utils;

pub use config::{default_score_bands, AnalysisConfig, DEFAULT_CODE_HEADER_TOKENS};
pub use engine::{ratio_definition, ratio_description, RatioDefinition, RatioEngine, RATIO_DEFINITIONS};
pub use error::{Result, SolvencyError};
pub use ingestion::{detect_code_column, find_code_cell, CodeColumn, CodeTableExtractor, RawTable};
pub use markup::{locate_markup, read_tables, read_tables_from_file};
pub use registry::{CodeRegistry, LineItemCode};
pub use report::{ReportAssembler, SummaryPrompt};
pub use schema::*;
pub use scoring::SolvencyIndexScorer;
pub use utils::{growth_rate, parse_number};

use log::{debug, info, warn};
use std::path::Path;

/// Runs one document through extraction, ratios and scoring.
///
/// Holds only the read-only configuration, so one analyzer can be shared across
/// threads and reused for any number of documents.
#[derive(Debug, Clone, Default)]
pub struct SolvencyAnalyzer {
    config: AnalysisConfig,
}

impl SolvencyAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_tables(&self, tables: &[RawTable]) -> AnalysisResult {
        info!("Analyzing {} extracted tables", tables.len());

        let extractor =
            CodeTableExtractor::new(&self.config.registry, &self.config.code_header_tokens);
        let codes = extractor.extract(tables);

        if codes.is_empty() {
            warn!("No registry line items found in {} tables", tables.len());
        } else {
            debug!(
                "Extracted {} of {} registry codes",
                codes.len(),
                self.config.registry.len()
            );
        }

        let ratios = RatioEngine::new(&self.config.registry).compute(&codes);
        let index = SolvencyIndexScorer::new(&self.config.score_bands).score(&ratios.levels);

        info!(
            "Computed {} ratio levels, {} growth rates, FSI {:?}",
            ratios.levels.len(),
            ratios.growth.len(),
            index.fsi
        );

        AnalysisResult {
            codes,
            levels: ratios.levels,
            growth: ratios.growth,
            index,
        }
    }

    pub fn analyze_markup(&self, markup: &str) -> AnalysisResult {
        let tables = read_tables(markup);
        debug!("Markup contains {} tables", tables.len());
        self.analyze_tables(&tables)
    }

    /// Analyzes the converted markdown for `stem` found under `output_dir`.
    ///
    /// Fails only when the converted file is missing or unreadable; a file whose
    /// tables carry little or no statement data still yields a (sparse) result.
    pub fn analyze_document(&self, output_dir: &Path, stem: &str) -> Result<AnalysisResult> {
        let path = locate_markup(output_dir, stem)?;
        info!("Processing {}", path.display());
        let tables = read_tables_from_file(&path)?;
        Ok(self.analyze_tables(&tables))
    }

    pub fn report(&self) -> ReportAssembler<'_> {
        ReportAssembler::new(&self.config.registry)
    }
}

pub fn analyze_tables(tables: &[RawTable]) -> AnalysisResult {
    SolvencyAnalyzer::default().analyze_tables(tables)
}

pub fn analyze_markup(markup: &str) -> AnalysisResult {
    SolvencyAnalyzer::default().analyze_markup(markup)
}
