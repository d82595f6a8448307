//! Report formatting utilities for GeoLens outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::insight::{Insight, Tone};
use crate::section::GeoSectionView;
use crate::table::DisplayRow;

/// Render a section as Markdown for `source` (a repository slug or file path).
pub fn render_section_markdown(source: &str, view: &GeoSectionView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# GeoLens Report\n");
    let _ = writeln!(output, "## {source}\n");
    let _ = writeln!(output, "- Map metric: `{}`", view.metric);
    match view.domain.upper {
        Some(upper) => {
            let _ = writeln!(output, "- Color scale: {} to {upper}", view.domain.lower);
        }
        None => {
            let _ = writeln!(output, "- Color scale: no data");
        }
    }
    let _ = writeln!(output);
    append_table(&mut output, view);
    append_insights(&mut output, &view.insights);
    output
}

/// Render a section as plain text for terminals.
pub fn render_section_text(source: &str, view: &GeoSectionView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{source} ({})", view.metric);
    let width = view
        .table
        .iter()
        .map(|row| row.label().chars().count())
        .max()
        .unwrap_or(0);
    for row in &view.table {
        let _ = writeln!(output, "  {:<width$}  {}", row.label(), row.value_text());
    }
    for insight in &view.insights {
        let _ = writeln!(output, "{} {}", tone_marker(insight.color), insight.message);
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_table(output: &mut String, view: &GeoSectionView) {
    let _ = writeln!(output, "### Top {} Countries", view.top_n);
    if view.table.is_empty() {
        let _ = writeln!(output, "No located countries.\n");
        return;
    }
    if view.table == [DisplayRow::NoData] {
        let _ = writeln!(output, "{}\n", DisplayRow::NoData.label());
        return;
    }
    let _ = writeln!(output, "| Country | {} |", view.table_metric);
    let _ = writeln!(output, "| --- | ---: |");
    for row in &view.table {
        let _ = writeln!(output, "| {} | {} |", row.label(), row.value_text());
    }
    let _ = writeln!(output);
}

fn append_insights(output: &mut String, insights: &[Insight]) {
    if insights.is_empty() {
        let _ = writeln!(output, "### Insights\nNo insights available.\n");
        return;
    }
    let _ = writeln!(output, "### Insights");
    for insight in insights {
        let _ = writeln!(output, "- [{}] {}", tone_label(insight.color), insight.message);
    }
    let _ = writeln!(output);
}

fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "positive",
        Tone::Negative => "negative",
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "+",
        Tone::Negative => "!",
    }
}
