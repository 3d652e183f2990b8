//! Terminal histograms of sample distributions

use console::style;

use crate::cli::helpers::format_value;

/// Widest bar in characters
pub const BAR_WIDTH: usize = 50;

/// Bin counts over [min, max]; the maximum lands in the last bin
pub fn bin_counts(samples: &[f64], bins: usize) -> Option<(f64, f64, Vec<usize>)> {
    if samples.is_empty() || bins == 0 {
        return None;
    }

    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut counts = vec![0; bins];
    if range <= 0.0 {
        counts[0] = samples.len();
        return Some((min, max, counts));
    }

    let bin_width = range / bins as f64;
    for &sample in samples {
        let bin = ((sample - min) / bin_width) as usize;
        counts[bin.min(bins - 1)] += 1;
    }
    Some((min, max, counts))
}

/// Render a horizontal histogram with mean and 95th percentile markers
pub fn render_histogram(title: &str, samples: &[f64], bins: usize, mean: f64, p95: f64) -> String {
    let Some((min, max, counts)) = bin_counts(samples, bins) else {
        return format!("   {} (no samples)", title);
    };

    let bin_width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let locate = |value: f64| (((value - min) / bin_width) as usize).min(bins - 1);
    let mean_bin = locate(mean);
    let p95_bin = locate(p95);
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut lines = vec![
        format!(
            "   {} ({} samples, {} bins):",
            style(title).bold(),
            samples.len(),
            bins
        ),
        String::new(),
    ];

    for (i, &count) in counts.iter().enumerate() {
        let bar_width = (count as f64 / max_count as f64 * BAR_WIDTH as f64) as usize;
        let bin_start = min + i as f64 * bin_width;

        let marker = match (i == mean_bin, i == p95_bin) {
            (true, true) => " ◄mean/P95",
            (true, false) => " ◄mean",
            (false, true) => " ◄P95",
            _ => "",
        };

        let bar = if i <= p95_bin {
            style("█".repeat(bar_width)).green()
        } else {
            style("░".repeat(bar_width)).yellow()
        };

        lines.push(format!(
            "   {:>12} │{:<width$}│ {:>6}{}",
            format_value(bin_start),
            bar,
            count,
            style(marker).cyan(),
            width = BAR_WIDTH
        ));
    }

    lines.join("\n")
}
