use super::{file_label, load_har, metrics_calculator};
use crate::OutputFormat;
use anyhow::{Result, bail};
use console::style;
use harscope_core::analysis::{AggregateSummary, Comparator, Comparison, Metrics, Verdict};
use rayon::prelude::*;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub comparison: Comparison,
    pub summary: AggregateSummary,
    pub insights: Vec<String>,
}

/// Load every file, compute its metrics and compare them against the first.
///
/// Metrics are computed in parallel; the result keeps the input order.
pub fn compare_files(files: &[PathBuf], third_party: Option<&[String]>) -> Result<CompareReport> {
    if files.len() < 2 {
        bail!("At least two HAR files are required for comparison");
    }

    let calculator = metrics_calculator(third_party);
    let metrics: Vec<Metrics> = files
        .par_iter()
        .map(|file| {
            let har = load_har(file)?;
            tracing::debug!(
                "Loaded {} entries from {}",
                har.log.entries.len(),
                file.display()
            );
            Ok(calculator.calculate(&har.log.entries, har.page_on_load()))
        })
        .collect::<Result<_>>()?;

    let labels = files.iter().map(|f| file_label(f)).collect();
    let summary = AggregateSummary::from_metrics(&metrics);
    let comparison = Comparator::compare(labels, metrics);
    let insights = comparison.insights();

    Ok(CompareReport {
        comparison,
        summary,
        insights,
    })
}

pub fn execute(
    files: &[PathBuf],
    third_party: Option<&[String]>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Comparing {} HAR files", files.len());

    let report = compare_files(files, third_party)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report)?,
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn styled_change(change: &str, verdict: Verdict) -> console::StyledObject<&str> {
    match verdict {
        Verdict::Better => style(change).green(),
        Verdict::Worse => style(change).red(),
        Verdict::Neutral => style(change).yellow(),
        Verdict::Baseline | Verdict::Unchanged | Verdict::Unmeasured => style(change).dim(),
    }
}

fn output_pretty(report: &CompareReport) {
    let comparison = &report.comparison;

    println!("\n{}", style("HAR Comparison").bold().cyan());
    println!("{}", style(format!("Baseline: {}", comparison.files[0])).dim());

    println!("\n{}", style("Overview").bold());
    println!("  Files:              {}", report.summary.total_files);
    println!("  Total Requests:     {}", report.summary.total_requests);
    println!("  Total Errors:       {}", report.summary.total_errors);
    println!(
        "  Avg Load Time:      {:.1} ms",
        report.summary.average_load_time
    );
    match report.summary.average_ttfb {
        Some(ttfb) => println!("  Avg TTFB:           {:.1} ms", ttfb),
        None => println!("  Avg TTFB:           {}", style("not measured").dim()),
    }
    println!(
        "  Total Transfer:     {:.2} MB",
        report.summary.total_transfer_mb
    );

    for (column, file) in comparison.files.iter().enumerate().skip(1) {
        println!("\n{}", style(format!("{} vs {}", file, comparison.files[0])).bold());
        for diff in &comparison.differences {
            println!(
                "  {:<22} {:>12} -> {:>12}  {}",
                diff.name,
                diff.values[0],
                diff.values[column],
                styled_change(&diff.changes[column], diff.verdicts[column])
            );
        }
    }

    let summary = &comparison.summary;
    println!(
        "\n📊 {} Better | {} Worse | {} Unchanged (of {} metrics)",
        style(summary.better_count).green(),
        style(summary.worse_count).red(),
        summary.unchanged_count,
        summary.total_metrics
    );

    println!("\n{}", style("Insights").bold());
    for insight in &report.insights {
        println!("  • {}", insight);
    }
    println!();
}

fn output_json(report: &CompareReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &CompareReport) -> Result<()> {
    let comparison = &report.comparison;
    let mut writer = csv::Writer::from_writer(io::stdout().lock());

    let mut header = vec!["Metric".to_string()];
    for (column, file) in comparison.files.iter().enumerate() {
        header.push(file.clone());
        if column > 0 {
            header.push(format!("{} Change", file));
        }
    }
    writer.write_record(&header)?;

    for diff in &comparison.differences {
        let mut row = vec![diff.name.as_str()];
        for column in 0..comparison.files.len() {
            row.push(&diff.values[column]);
            if column > 0 {
                row.push(&diff.changes[column]);
            }
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
