use crate::schema::{BandDirection, RatioBand, ScoreBand, SolvencyIndex};
use crate::utils::score_linear;
use std::collections::BTreeMap;

pub fn normalize(value: f64, band: &ScoreBand) -> f64 {
    let reverse = band.direction == BandDirection::Descending;
    score_linear(value, band.min, band.max, reverse)
}

pub struct SolvencyIndexScorer<'a> {
    bands: &'a [RatioBand],
}

impl<'a> SolvencyIndexScorer<'a> {
    pub fn new(bands: &'a [RatioBand]) -> Self {
        Self { bands }
    }

    /// Scores every banded ratio that has a level and averages what was scored.
    /// Ratios without a level are left out rather than counted as zero.
    pub fn score(&self, levels: &BTreeMap<String, f64>) -> SolvencyIndex {
        let scores: BTreeMap<String, f64> = self
            .bands
            .iter()
            .filter_map(|entry| {
                let level = levels.get(&entry.ratio)?;
                Some((entry.ratio.clone(), normalize(*level, &entry.band)))
            })
            .collect();

        let fsi = if scores.is_empty() {
            None
        } else {
            Some(scores.values().sum::<f64>() / scores.len() as f64)
        };

        SolvencyIndex { scores, fsi }
    }
}
