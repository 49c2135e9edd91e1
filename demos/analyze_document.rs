//! Analyze one converted document and print the stability report.
//!
//! ```text
//! cargo run --example analyze_document -- <converter-output-dir> <document-stem> [config.json]
//! ```

use solvency_index::{AnalysisConfig, ReportAssembler, SolvencyAnalyzer, SolvencyError};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(output_dir), Some(stem)) = (args.next(), args.next()) else {
        eprintln!("usage: analyze_document <converter-output-dir> <document-stem> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => AnalysisConfig::from_file(PathBuf::from(path))?,
        None => AnalysisConfig::default(),
    };
    let analyzer = SolvencyAnalyzer::new(config)?;

    let result = match analyzer.analyze_document(&PathBuf::from(&output_dir), &stem) {
        Ok(result) => result,
        Err(SolvencyError::ExtractionUnavailable { document, searched }) => {
            eprintln!("'{}' has not been converted yet. Looked in:", document);
            for path in searched {
                eprintln!("  {}", path.display());
            }
            std::process::exit(1);
        }
        Err(other) => return Err(other.into()),
    };

    let text = analyzer.report().to_text(&result, &stem);
    println!("{}", text);

    match result.fsi() {
        Some(fsi) => println!("FSI {:.3} from {} scored ratios", fsi, result.index.scores.len()),
        None => println!("No ratio could be scored: the statement tables were incomplete."),
    }

    let prompt = ReportAssembler::summary_prompt(&text);
    println!(
        "\nSummary prompt ready for an external model ({} characters).",
        prompt.user.chars().count()
    );

    Ok(())
}
