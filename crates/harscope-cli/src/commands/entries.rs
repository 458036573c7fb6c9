use super::{EntryFilter, file_label, load_har};
use crate::OutputFormat;
use anyhow::{Result, bail};
use console::style;
use harscope_core::analysis::{ResourceType, format_size};
use harscope_core::har::{Entry, Header};
use serde::Serialize;
use std::io;
use std::path::Path;

const DETAIL_HEADER_LIMIT: usize = 5;
const HEADER_VALUE_MAX: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct EntriesOptions {
    pub filter: EntryFilter,
    /// Show one entry in detail, by its position in the file
    pub index: Option<usize>,
}

/// One line of the entry listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    pub index: usize,
    pub method: String,
    pub status: i64,
    pub time: f64,
    pub size: u64,
    pub resource_type: ResourceType,
    pub url: String,
}

impl EntryRow {
    fn new(index: usize, entry: &Entry) -> Self {
        Self {
            index,
            method: entry.request.method.clone(),
            status: entry.response.status,
            time: entry.time,
            size: entry.content_size(),
            resource_type: ResourceType::from_mime(&entry.response.content.mime_type),
            url: entry.request.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntriesReport {
    pub file: String,
    pub total_entries: usize,
    pub rows: Vec<EntryRow>,
}

/// List the entries matching the filter, keeping their positions in the file
pub fn list_entries(file: &Path, filter: &EntryFilter) -> Result<EntriesReport> {
    let har = load_har(file)?;
    let criteria = filter.criteria()?;

    let rows = har
        .log
        .entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| criteria.matches(entry))
        .map(|(index, entry)| EntryRow::new(index, entry))
        .collect();

    Ok(EntriesReport {
        file: file_label(file),
        total_entries: har.log.entries.len(),
        rows,
    })
}

/// The entry at `index` in the file
pub fn entry_at(file: &Path, index: usize) -> Result<Entry> {
    let har = load_har(file)?;
    let total = har.log.entries.len();

    match har.log.entries.into_iter().nth(index) {
        Some(entry) => Ok(entry),
        None => bail!("Entry {} not found: file has {} entries", index, total),
    }
}

pub fn execute(file: &Path, options: &EntriesOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Listing entries of HAR file: {}", file.display());

    if let Some(index) = options.index {
        let entry = entry_at(file, index)?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
            OutputFormat::Table => output_timings_table(&entry)?,
            OutputFormat::Pretty => output_detail(index, &entry),
        }
        return Ok(());
    }

    let report = list_entries(file, &options.filter)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => output_table(&report)?,
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn styled_status(status: i64) -> console::StyledObject<i64> {
    match status {
        400.. => style(status).red(),
        300..=399 => style(status).yellow(),
        _ => style(status).green(),
    }
}

fn output_pretty(report: &EntriesReport) {
    println!(
        "\n{}",
        style(format!(
            "Entries: {} ({} of {})",
            report.file,
            report.rows.len(),
            report.total_entries
        ))
        .bold()
        .cyan()
    );
    println!();
    println!(
        "  {:>4}  {:<7} {:>6} {:>10} {:>9}  {:<10} URL",
        "#", "METHOD", "STATUS", "TIME", "SIZE", "TYPE"
    );

    for row in &report.rows {
        println!(
            "  {:>4}  {:<7} {:>6} {:>8.1}ms {:>9}  {:<10} {}",
            row.index,
            row.method,
            styled_status(row.status),
            row.time,
            format_size(row.size),
            row.resource_type.as_str(),
            row.url
        );
    }
    println!();
}

/// `name: value` with long values cut to a readable width
pub fn format_header(header: &Header) -> String {
    if header.value.chars().count() > HEADER_VALUE_MAX {
        let value: String = header.value.chars().take(HEADER_VALUE_MAX - 3).collect();
        format!("{}: {}...", header.name, value)
    } else {
        format!("{}: {}", header.name, header.value)
    }
}

fn print_headers(title: &str, headers: &[Header]) {
    if headers.is_empty() {
        return;
    }

    println!("\n{}", style(format!("{} (Top {})", title, DETAIL_HEADER_LIMIT)).bold());
    for header in headers.iter().take(DETAIL_HEADER_LIMIT) {
        println!("  {}", format_header(header));
    }
    if headers.len() > DETAIL_HEADER_LIMIT {
        println!("  ... and {} more headers", headers.len() - DETAIL_HEADER_LIMIT);
    }
}

fn output_detail(index: usize, entry: &Entry) {
    let request = &entry.request;
    let response = &entry.response;
    let timings = &entry.timings;

    println!("\n{}", style(format!("Request Details #{}", index)).bold().cyan());

    println!("\n{}", style("Request").bold());
    println!("  Method:        {}", request.method);
    println!("  URL:           {}", request.url);
    println!("  HTTP Version:  {}", request.http_version);

    println!("\n{}", style("Response").bold());
    println!(
        "  Status:        {} {}",
        styled_status(response.status),
        response.status_text
    );
    println!("  Content Type:  {}", response.content.mime_type);
    println!("  Content Size:  {}", format_size(entry.content_size()));
    if let Some(saved) = response.content.compression.filter(|c| *c > 0) {
        println!("  Compression:   {} saved", format_size(saved as u64));
    }

    println!("\n{}", style("Timing Breakdown").bold());
    println!("  Total Time:    {:.1}ms", entry.time);
    for (label, value) in [
        ("Blocked", timings.blocked),
        ("DNS Lookup", timings.dns),
        ("TCP Connect", timings.connect),
        ("SSL Handshake", timings.ssl),
    ] {
        if value > 0.0 {
            println!("  {:<14} {:.1}ms", format!("{}:", label), value);
        }
    }
    println!("  Send:          {:.1}ms", timings.send);
    println!("  Wait (TTFB):   {:.1}ms", timings.wait);
    println!("  Receive:       {:.1}ms", timings.receive);

    print_headers("Request Headers", &request.headers);
    print_headers("Response Headers", &response.headers);
    println!();
}

fn output_table(report: &EntriesReport) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());

    writer.write_record(["Index", "Method", "Status", "Time (ms)", "Size (bytes)", "Type", "URL"])?;
    for row in &report.rows {
        writer.write_record([
            row.index.to_string(),
            row.method.clone(),
            row.status.to_string(),
            format!("{:.1}", row.time),
            row.size.to_string(),
            row.resource_type.as_str().to_string(),
            row.url.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn output_timings_table(entry: &Entry) -> Result<()> {
    let timings = &entry.timings;
    let mut writer = csv::Writer::from_writer(io::stdout().lock());

    writer.write_record(["Phase", "Time (ms)"])?;
    for (phase, value) in [
        ("Blocked", timings.blocked),
        ("DNS", timings.dns),
        ("Connect", timings.connect),
        ("SSL", timings.ssl),
        ("Send", timings.send),
        ("Wait", timings.wait),
        ("Receive", timings.receive),
        ("Total", entry.time),
    ] {
        writer.write_record([phase.to_string(), format!("{:.1}", value)])?;
    }

    writer.flush()?;
    Ok(())
}
