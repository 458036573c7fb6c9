use super::{EntryFilter, file_label, load_har};
use crate::OutputFormat;
use anyhow::Result;
use console::{Style, style};
use harscope_core::analysis::{
    Outcome, ResourceType, TimelineBuilder, TimelineEvent, WaterfallBar, WaterfallLayout,
};
use serde::Serialize;
use std::io;
use std::path::Path;

const DEFAULT_WIDTH: usize = 120;
const LABEL_WIDTH: usize = 30;
const LABEL_MAX: usize = 28;

#[derive(Debug, Clone, Default)]
pub struct TimelineOptions {
    /// Total output width in columns; the terminal width when unset
    pub width: Option<usize>,
    /// Maximum number of rows to draw in pretty output
    pub limit: Option<usize>,
    pub filter: EntryFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub file: String,
    pub events: Vec<TimelineEvent>,
    pub layout: WaterfallLayout,
}

/// Width to lay the waterfall out in when none was requested
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Build the ordered timeline and its waterfall layout for one HAR file
pub fn build_timeline(file: &Path, options: &TimelineOptions) -> Result<TimelineReport> {
    let har = load_har(file)?;
    let criteria = options.filter.criteria()?;
    let events = TimelineBuilder::build_indexed(
        har.log
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| criteria.matches(entry)),
    );
    let width = options.width.unwrap_or_else(terminal_width);
    let layout = WaterfallLayout::compute(&events, width);

    Ok(TimelineReport {
        file: file_label(file),
        events,
        layout,
    })
}

pub fn execute(file: &Path, options: &TimelineOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Building timeline for HAR file: {}", file.display());

    let report = build_timeline(file, options)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report)?,
        OutputFormat::Pretty => output_pretty(&report, options.limit),
    }

    Ok(())
}

/// Short row label: method plus the last path segment, or the host for `/`
pub fn request_label(event: &TimelineEvent) -> String {
    let without_query = event.url.split(['?', '#']).next().unwrap_or(&event.url);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    let name = match after_scheme.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => last,
        _ => after_scheme.split('/').next().unwrap_or(after_scheme),
    };

    let label = format!("{} {}", event.method, name);
    if label.chars().count() > LABEL_MAX {
        let truncated: String = label.chars().take(LABEL_MAX - 3).collect();
        format!("{}...", truncated)
    } else {
        label
    }
}

fn bar_style(event: &TimelineEvent) -> Style {
    match event.outcome() {
        Outcome::Error => return Style::new().red(),
        Outcome::Redirect => return Style::new().yellow(),
        Outcome::Success => {}
    }

    match event.resource_type() {
        ResourceType::Html => Style::new().blue(),
        ResourceType::JavaScript => Style::new().yellow(),
        ResourceType::Css => Style::new().green(),
        ResourceType::Image => Style::new().magenta(),
        ResourceType::Json => Style::new().cyan(),
        ResourceType::Font => Style::new().black().bright(),
        ResourceType::Other => Style::new().white(),
    }
}

/// One chart row: bar cells, then the outcome marker when there is room
pub fn render_bar(bar: &WaterfallBar, chart_width: usize) -> String {
    let mut cells = vec![' '; chart_width];
    for cell in cells.iter_mut().skip(bar.start).take(bar.width) {
        *cell = '█';
    }
    if let Some(marker) = bar.marker {
        cells[marker.column] = marker.outcome.symbol();
    }
    cells.into_iter().collect()
}

fn render_scale(layout: &WaterfallLayout) -> (String, String) {
    let width = layout.chart_width;
    let mut axis = vec!['─'; width];
    let mut labels = vec![' '; width];

    for tick in layout.scale_ticks() {
        axis[tick.column] = '┬';

        let text: Vec<char> = format!("{:.0}ms", tick.offset_ms).chars().collect();
        let start = tick
            .column
            .saturating_sub(text.len() / 2)
            .min(width.saturating_sub(text.len()));
        for (slot, ch) in labels.iter_mut().skip(start).zip(text) {
            *slot = ch;
        }
    }

    (axis.into_iter().collect(), labels.into_iter().collect())
}

fn output_pretty(report: &TimelineReport, limit: Option<usize>) {
    println!(
        "\n{}",
        style(format!("Request Timeline: {}", report.file)).bold().cyan()
    );

    if report.events.is_empty() {
        println!("\n  {}\n", style("No entries to display in timeline").dim());
        return;
    }

    let layout = &report.layout;
    let padding = " ".repeat(LABEL_WIDTH);
    let (axis, labels) = render_scale(layout);
    println!();
    println!("{}{}", padding, axis);
    println!("{}{}", padding, labels);
    println!();

    let shown = limit.unwrap_or(report.events.len()).min(report.events.len());
    for (event, bar) in report.events.iter().zip(&layout.bars).take(shown) {
        println!(
            "{:<width$}{} {:.1}ms",
            request_label(event),
            bar_style(event).apply_to(render_bar(bar, layout.chart_width)),
            event.duration,
            width = LABEL_WIDTH
        );
    }

    if shown < report.events.len() {
        println!("... and {} more requests", report.events.len() - shown);
    }

    println!();
    println!(
        "{} HTML  {} JS  {} CSS  {} Images  {} API/JSON  {} Fonts",
        style("█").blue(),
        style("█").yellow(),
        style("█").green(),
        style("█").magenta(),
        style("█").cyan(),
        style("█").black().bright()
    );
    println!("Status: ✓ Success  ↻ Redirect  ✗ Error");
    println!();
}

fn output_json(report: &TimelineReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &TimelineReport) -> Result<()> {
    let layout = &report.layout;
    let mut writer = csv::Writer::from_writer(io::stdout().lock());

    writer.write_record([
        "Index",
        "Method",
        "Status",
        "Offset (ms)",
        "Duration (ms)",
        "Start Column",
        "Width",
        "URL",
    ])?;
    for (event, bar) in report.events.iter().zip(&layout.bars) {
        writer.write_record([
            event.index.to_string(),
            event.method.clone(),
            event.status.to_string(),
            format!("{:.1}", event.start_ms() - layout.window_start_ms),
            format!("{:.1}", event.duration),
            bar.start.to_string(),
            bar.width.to_string(),
            event.url.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harscope_core::analysis::Marker;

    fn event(url: &str) -> TimelineEvent {
        TimelineEvent {
            index: 0,
            url: url.to_string(),
            method: "GET".to_string(),
            status: 200,
            start_time: Default::default(),
            duration: 10.0,
            size: 0,
            content_type: String::new(),
        }
    }

    #[test]
    fn test_request_label_uses_last_segment() {
        assert_eq!(
            request_label(&event("https://example.com/static/app.js?v=3")),
            "GET app.js"
        );
    }

    #[test]
    fn test_request_label_falls_back_to_host() {
        assert_eq!(request_label(&event("https://example.com/")), "GET example.com");
        assert_eq!(request_label(&event("https://example.com")), "GET example.com");
    }

    #[test]
    fn test_request_label_truncates() {
        let label = request_label(&event(
            "https://example.com/a-very-long-resource-name-that-overflows.js",
        ));
        assert_eq!(label.chars().count(), LABEL_MAX);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn test_render_bar_with_marker() {
        let bar = WaterfallBar {
            start: 2,
            width: 3,
            marker: Some(Marker {
                column: 5,
                outcome: Outcome::Error,
            }),
        };

        assert_eq!(render_bar(&bar, 8), "  ███✗  ");
    }

    #[test]
    fn test_render_bar_without_marker() {
        let bar = WaterfallBar {
            start: 0,
            width: 4,
            marker: None,
        };

        assert_eq!(render_bar(&bar, 4), "████");
    }
}
