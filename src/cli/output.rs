//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{format_value, truncate_str};
use crate::cli::OutputFormat;
use crate::core::statistics::StatRecord;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Table,
        other => other,
    }
}

/// Render rows under a header as a rounded table
pub fn render_table<I, R>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Statistics records as a table
pub fn stat_table(records: &[StatRecord]) -> String {
    render_table(
        &[
            "Design Option",
            "Stage",
            "Category",
            "Mean",
            "STD",
            "COV",
            "Min",
            "Median",
            "P95",
            "Max",
            "Outliers",
        ],
        records.iter().map(|r| {
            vec![
                truncate_str(&r.design_option, 28),
                r.stage.clone(),
                r.category.to_string(),
                format_value(r.mean),
                format_value(r.std),
                format!("{:.3}", r.cov),
                format_value(r.min),
                format_value(r.median),
                format_value(r.p95),
                format_value(r.max),
                r.outliers.to_string(),
            ]
        }),
    )
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

/// Serialize rows as CSV to stdout
pub fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer.serialize(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
