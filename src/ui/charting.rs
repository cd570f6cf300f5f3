use crate::progress::Results;

/// One bar per answered question: `Q1`, `Q2`, ... with its seconds.
pub fn time_bars(results: &Results) -> Vec<(String, u64)> {
    results
        .questions
        .iter()
        .zip(&results.times)
        .map(|(attempt, secs)| (format!("Q{}", attempt.question_index + 1), *secs))
        .collect()
}

/// Bar width so `count` bars (plus one-cell gaps) fill `width`, kept in 1..=9.
pub fn bar_width(count: usize, width: u16) -> u16 {
    if count == 0 {
        return 1;
    }
    let per_bar = (width as usize / count).saturating_sub(1);
    per_bar.clamp(1, 9) as u16
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
