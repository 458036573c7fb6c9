use super::{EntryFilter, file_label, load_har, metrics_calculator};
use crate::OutputFormat;
use anyhow::Result;
use harscope_core::analysis::{
    BreakdownStats, Metrics, PageLoadSource, Rating, RequestBreakdown, format_size,
};
use harscope_core::filter::filter_entries;
use harscope_core::har::Entry;
use serde::Serialize;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MetricsOptions {
    /// Number of slowest/largest requests to list; 0 disables the breakdown
    pub top: usize,
    pub filter: EntryFilter,
    pub third_party: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub file: String,
    /// Entries the metrics were computed over, after filtering
    pub analyzed_entries: usize,
    pub total_entries: usize,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BreakdownStats>,
}

/// Compute metrics for one HAR file
pub fn analyze_file(file: &Path, options: &MetricsOptions) -> Result<MetricsReport> {
    let har = load_har(file)?;
    let criteria = options.filter.criteria()?;
    let calculator = metrics_calculator(options.third_party.as_deref());

    let total_entries = har.log.entries.len();
    let filtered;
    let (entries, page_on_load): (&[Entry], _) = if criteria.is_empty() {
        (har.log.entries.as_slice(), har.page_on_load())
    } else {
        // The page's onLoad timing describes the whole page, not a filtered subset
        filtered = filter_entries(&har.log.entries, &criteria);
        (filtered.as_slice(), None)
    };

    let metrics = calculator.calculate(entries, page_on_load);
    let breakdown =
        (options.top > 0).then(|| RequestBreakdown::new(options.top).calculate(entries));

    Ok(MetricsReport {
        file: file_label(file),
        analyzed_entries: entries.len(),
        total_entries,
        metrics,
        breakdown,
    })
}

pub fn execute(file: &Path, options: &MetricsOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Calculating metrics for HAR file: {}", file.display());

    let report = analyze_file(file, options)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report)?,
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn styled_rating(text: String, rating: Rating) -> console::StyledObject<String> {
    use console::style;

    match rating {
        Rating::Good => style(text).green(),
        Rating::Warning => style(text).yellow(),
        Rating::Danger => style(text).red(),
    }
}

fn output_pretty(report: &MetricsReport) {
    use console::style;

    let m = &report.metrics;

    println!(
        "\n{}",
        style(format!("Performance Metrics: {}", report.file)).bold().cyan()
    );

    if report.analyzed_entries != report.total_entries {
        println!(
            "{}",
            style(format!(
                "  (filtered: {} of {} entries)",
                report.analyzed_entries, report.total_entries
            ))
            .dim()
        );
    }

    println!("\n{}", style("Timing").bold());
    let load_note = match m.page_load_source {
        PageLoadSource::PageTimings => " (onLoad)",
        PageLoadSource::Estimated => " (estimated)",
        PageLoadSource::None => "",
    };
    println!(
        "  Page Load Time:     {}{}",
        styled_rating(format!("{:.1} ms", m.page_load_time), Rating::for_load_time(m.page_load_time)),
        style(load_note).dim()
    );
    match m.ttfb {
        Some(ttfb) => println!(
            "  Time to First Byte: {}",
            styled_rating(format!("{:.1} ms", ttfb), Rating::for_ttfb(ttfb))
        ),
        None => println!("  Time to First Byte: {}", style("not measured").dim()),
    }
    println!("  Avg DNS Time:       {:.1} ms", m.dns_time);
    println!("  Avg Connect Time:   {:.1} ms", m.connect_time);
    println!("  Avg SSL Time:       {:.1} ms", m.ssl_time);
    println!("  Total Time:         {:.1} ms", m.total_time);

    println!("\n{}", style("Requests").bold());
    println!("  Total Requests:     {}", m.total_requests);
    println!(
        "  Error Requests:     {}",
        styled_rating(m.error_requests.to_string(), Rating::for_errors(m.error_requests))
    );
    println!("  Third-party:        {}", m.third_party_requests);
    println!("  Cache Hit Ratio:    {:.1}%", m.cache_hit_ratio);
    println!("  Total Transfer:     {}", format_size(m.total_size));

    if let Some(breakdown) = &report.breakdown {
        if !breakdown.slowest.is_empty() {
            println!("\n{}", style("Slowest Requests:").bold());
            for (i, req) in breakdown.slowest.iter().enumerate() {
                println!(
                    "  {}. [{:.1} ms] {} {} - {}",
                    i + 1,
                    req.time,
                    req.method,
                    req.status,
                    req.url
                );
            }
        }

        if !breakdown.largest.is_empty() {
            println!("\n{}", style("Largest Requests:").bold());
            for (i, req) in breakdown.largest.iter().enumerate() {
                println!(
                    "  {}. [{}] {} {} - {}",
                    i + 1,
                    format_size(req.size),
                    req.method,
                    req.status,
                    req.url
                );
            }
        }

        if !breakdown.errors.is_empty() {
            println!("\n{}", style("Failed Requests:").bold().red());
            for req in &breakdown.errors {
                println!("  {} {} - {}", req.status, req.method, req.url);
            }
        }

        println!("\n{}", style("By Resource Type:").bold());
        for (resource_type, bucket) in &breakdown.by_type {
            println!(
                "  {:<12} {:>4} requests  {}",
                resource_type.as_str(),
                bucket.count,
                format_size(bucket.bytes)
            );
        }
    }

    println!();
}

fn output_json(report: &MetricsReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &MetricsReport) -> Result<()> {
    let m = &report.metrics;
    let rows = [
        ("File", report.file.clone()),
        ("Total Load Time (ms)", format!("{:.1}", m.page_load_time)),
        ("TTFB (ms)", format!("{:.1}", m.ttfb_or_sentinel())),
        ("DNS Time (ms)", format!("{:.1}", m.dns_time)),
        ("Connect Time (ms)", format!("{:.1}", m.connect_time)),
        ("SSL Time (ms)", format!("{:.1}", m.ssl_time)),
        ("Total Requests", m.total_requests.to_string()),
        ("Error Requests", m.error_requests.to_string()),
        ("Third-party Requests", m.third_party_requests.to_string()),
        ("Cache Hit Ratio (%)", format!("{:.1}", m.cache_hit_ratio)),
        (
            "Total Size (MB)",
            format!("{:.2}", m.total_size as f64 / (1024.0 * 1024.0)),
        ),
    ];

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer.write_record(["Metric", "Value"])?;
    for (name, value) in &rows {
        writer.write_record([*name, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
