use crate::cli::OutputFormat;
use crate::models::{Finding, Report};
use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::fs;
use std::path::Path;

/// Which findings end up in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Only findings which failed the check
    Violations,
    /// Every annotation
    All,
}

/// Generate and output a report in the specified format
pub fn generate_report(
    report: &Report,
    format: OutputFormat,
    selection: Selection,
    output_path: Option<&Path>,
) -> Result<()> {
    let output = match format {
        OutputFormat::Text => format_text(report, selection),
        OutputFormat::Table => format_table(report, selection),
        OutputFormat::Json => format_json(report)?,
    };

    if let Some(path) = output_path {
        fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        eprintln!("Report written to {}", path.display());
    } else if !output.is_empty() {
        print!("{}", output);
    }

    Ok(())
}

fn selected(report: &Report, selection: Selection) -> Vec<&Finding> {
    match selection {
        Selection::Violations => report.violations().collect(),
        Selection::All => report.findings.iter().collect(),
    }
}

/// Description of a finding: its violation, or its tag, expiry and content
fn describe(finding: &Finding) -> String {
    if let Some(ref violation) = finding.violation {
        return violation.clone();
    }
    let annotation = &finding.annotation;
    let expiry = annotation
        .expiry
        .map(|date| date.to_string())
        .unwrap_or_else(|| "no expiry".to_string());
    format!("{} ({}) {}", annotation.tag, expiry, annotation.content)
        .trim_end()
        .to_string()
}

/// Format report as `file:line message` lines
fn format_text(report: &Report, selection: Selection) -> String {
    selected(report, selection)
        .into_iter()
        .map(|finding| {
            format!(
                "{}:{} {}\n",
                finding.file.display(),
                finding.annotation.line_number,
                describe(finding)
            )
        })
        .collect()
}

/// Format report as terminal table
fn format_table(report: &Report, selection: Selection) -> String {
    let mut output = String::new();

    // Header
    let line = "─".repeat(58);
    output.push_str(&format!("╭{}╮\n", line));
    output.push_str(&format!("│ {:^56} │\n", "Overdue - Annotation Report"));
    output.push_str(&format!("│ Files Scanned: {:<41} │\n", report.files_scanned));
    output.push_str(&format!("│ Annotations: {:<43} │\n", report.total_annotations));
    output.push_str(&format!("│ Violations: {:<44} │\n", report.violation_count));
    output.push_str(&format!("╰{}╯\n\n", line));

    // Summary by tag
    if !report.by_tag.is_empty() {
        output.push_str("Summary by Tag:\n");
        let mut tag_table = Table::new();
        tag_table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Tag").fg(Color::Cyan),
                Cell::new("Count").fg(Color::Cyan),
            ]);

        let mut tags: Vec<_> = report.by_tag.iter().collect();
        tags.sort_by(|a, b| b.1.cmp(a.1)); // Sort by count descending

        for (tag, count) in tags {
            tag_table.add_row(vec![tag.as_str(), &count.to_string()]);
        }

        output.push_str(&format!("{}\n\n", tag_table));
    }

    let findings = selected(report, selection);
    if !findings.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("File").fg(Color::Cyan),
                Cell::new("Line").fg(Color::Cyan),
                Cell::new("Tag").fg(Color::Cyan),
                Cell::new("Expiry").fg(Color::Cyan),
                Cell::new("Status").fg(Color::Cyan),
            ]);

        for finding in findings {
            let annotation = &finding.annotation;
            let status = match finding.violation {
                Some(ref violation) => Cell::new(violation).fg(Color::Red),
                None => Cell::new("ok").fg(Color::Green),
            };
            table.add_row(vec![
                Cell::new(finding.file.display().to_string()),
                Cell::new(annotation.line_number.to_string()),
                Cell::new(&annotation.tag),
                Cell::new(
                    annotation
                        .expiry
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                status,
            ]);
        }

        output.push_str(&format!("{}\n", table));
    }

    output
}

/// Format report as JSON
fn format_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}
