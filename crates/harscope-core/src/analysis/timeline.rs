use super::{Analyzer, ResourceType};
use crate::har::{Entry, Har};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Columns reserved for the request label to the left of the chart
pub const LABEL_COLUMN_WIDTH: usize = 35;

/// Narrowest chart ever laid out, whatever the requested width
pub const MIN_CHART_WIDTH: usize = 20;

const MIN_WINDOW_MS: f64 = 1.0;
const SCALE_FRACTIONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// One entry projected for temporal display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    /// Position of the entry in the source collection
    pub index: usize,
    pub url: String,
    pub method: String,
    pub status: i64,
    pub start_time: DateTime<Utc>,
    pub duration: f64,
    pub size: i64,
    pub content_type: String,
}

impl TimelineEvent {
    fn from_entry(index: usize, entry: &Entry) -> Self {
        Self {
            index,
            url: entry.request.url.clone(),
            method: entry.request.method.clone(),
            status: entry.response.status,
            start_time: entry.started_date_time,
            duration: entry.time,
            size: entry.response.content.size,
            content_type: entry.response.content.mime_type.clone(),
        }
    }

    pub fn start_ms(&self) -> f64 {
        self.start_time.timestamp_micros() as f64 / 1000.0
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms() + self.duration.max(0.0)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_status(self.status)
    }

    pub fn resource_type(&self) -> ResourceType {
        ResourceType::from_mime(&self.content_type)
    }
}

pub struct TimelineBuilder;

impl TimelineBuilder {
    /// Project entries into events ordered by start time.
    ///
    /// Events with identical start times keep their input order.
    pub fn build(entries: &[Entry]) -> Vec<TimelineEvent> {
        Self::build_indexed(entries.iter().enumerate())
    }

    /// Like [`build`](Self::build), for a subset of a collection whose
    /// entries keep their position in the full collection.
    pub fn build_indexed<'a, I>(entries: I) -> Vec<TimelineEvent>
    where
        I: IntoIterator<Item = (usize, &'a Entry)>,
    {
        let mut events: Vec<TimelineEvent> = entries
            .into_iter()
            .map(|(index, entry)| TimelineEvent::from_entry(index, entry))
            .collect();
        tracing::debug!("Building timeline from {} entries", events.len());

        events.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.index.cmp(&b.index))
        });

        events
    }
}

impl Analyzer for TimelineBuilder {
    type Output = Vec<TimelineEvent>;

    fn analyze(&self, har: &Har) -> Self::Output {
        Self::build(&har.log.entries)
    }
}

/// Request outcome shown by the marker after each bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Redirect,
    Error,
}

impl Outcome {
    pub fn from_status(status: i64) -> Self {
        if status >= 400 {
            Outcome::Error
        } else if status >= 300 {
            Outcome::Redirect
        } else {
            Outcome::Success
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Outcome::Success => '✓',
            Outcome::Redirect => '↻',
            Outcome::Error => '✗',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub column: usize,
    pub outcome: Outcome,
}

/// Pixel placement of one event, in chart-local columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaterfallBar {
    pub start: usize,
    pub width: usize,
    /// Present only when the column after the bar is still inside the chart
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleTick {
    pub column: usize,
    pub offset_ms: f64,
}

/// Time-to-column projection of a set of timeline events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallLayout {
    pub chart_width: usize,
    /// Earliest event start, epoch milliseconds
    pub window_start_ms: f64,
    /// Window length in milliseconds, never below 1
    pub window_ms: f64,
    /// Milliseconds represented by one column
    pub ms_per_column: f64,
    /// One bar per event, in event order
    pub bars: Vec<WaterfallBar>,
}

impl WaterfallLayout {
    /// Chart columns available once the label column is taken out of `pixel_width`
    pub fn chart_width_for(pixel_width: usize) -> usize {
        pixel_width
            .saturating_sub(LABEL_COLUMN_WIDTH)
            .max(MIN_CHART_WIDTH)
    }

    pub fn compute(events: &[TimelineEvent], pixel_width: usize) -> Self {
        let chart_width = Self::chart_width_for(pixel_width);

        if events.is_empty() {
            return Self {
                chart_width,
                window_start_ms: 0.0,
                window_ms: MIN_WINDOW_MS,
                ms_per_column: MIN_WINDOW_MS / chart_width as f64,
                bars: Vec::new(),
            };
        }

        let (window_start_ms, window_end_ms) = events.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(start, end), event| (start.min(event.start_ms()), end.max(event.end_ms())),
        );
        let window_ms = (window_end_ms - window_start_ms).max(MIN_WINDOW_MS);
        let ms_per_column = window_ms / chart_width as f64;

        let bars = events
            .iter()
            .map(|event| {
                let offset = event.start_ms() - window_start_ms;
                let start = ((offset / ms_per_column) as usize).min(chart_width - 1);
                let width = ((event.duration.max(0.0) / ms_per_column) as usize)
                    .max(1)
                    .min(chart_width - start);

                let end = start + width;
                let marker = (end < chart_width).then(|| Marker {
                    column: end,
                    outcome: event.outcome(),
                });

                WaterfallBar {
                    start,
                    width,
                    marker,
                }
            })
            .collect();

        tracing::debug!(
            "Waterfall layout: {} events over {:.1}ms in {} columns",
            events.len(),
            window_ms,
            chart_width
        );

        Self {
            chart_width,
            window_start_ms,
            window_ms,
            ms_per_column,
            bars,
        }
    }

    /// Tick marks at 0/25/50/75/100% of the window
    pub fn scale_ticks(&self) -> Vec<ScaleTick> {
        SCALE_FRACTIONS
            .iter()
            .map(|fraction| ScaleTick {
                column: ((self.chart_width as f64 * fraction) as usize).min(self.chart_width - 1),
                offset_ms: self.window_ms * fraction,
            })
            .collect()
    }
}
