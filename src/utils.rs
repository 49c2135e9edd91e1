/// Parses a figure the way Russian statements print it: `"1 234"`, `"(5 678)"`,
/// `"12,5"`. Returns `None` for anything that does not resolve to a finite number,
/// including empty cells and a lone dash.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;

    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned = cleaned.replace('(', "-").replace(')', "");
    cleaned = cleaned.replace(',', ".");

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convenience wrapper over [`parse_number`] for a cell that is known to exist.
pub fn parse_cell(cell: &str) -> Option<f64> {
    parse_number(Some(cell))
}

/// Relative change `current / previous - 1`, in fractions.
///
/// Undefined when either side is missing, the previous period is zero, or the
/// result overflows.
pub fn growth_rate(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if previous == 0.0 {
        return None;
    }
    Some(current / previous - 1.0).filter(|v| v.is_finite())
}

/// Linear position of `value` inside `[min, max]`, clamped to `[0, 1]`.
/// With `reverse` set, lower values score higher.
pub fn score_linear(value: f64, min: f64, max: f64, reverse: bool) -> f64 {
    if !reverse {
        if value <= min {
            return 0.0;
        }
        if value >= max {
            return 1.0;
        }
        (value - min) / (max - min)
    } else {
        if value <= min {
            return 1.0;
        }
        if value >= max {
            return 0.0;
        }
        (max - value) / (max - min)
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
