mod breakdown;
mod comparison;
mod metrics;
mod timeline;

pub use breakdown::{BreakdownStats, RequestBreakdown, RequestSummary, TypeBreakdown};
pub use comparison::{
    AggregateSummary, Comparator, Comparison, ComparisonSummary, Direction, MetricDifference,
    MetricId, Verdict, format_size,
};
pub use metrics::{Metrics, MetricsCalculator, PageLoadSource, ThirdPartyList, UNMEASURED};
pub use timeline::{
    LABEL_COLUMN_WIDTH, MIN_CHART_WIDTH, Marker, Outcome, ScaleTick, TimelineBuilder,
    TimelineEvent, WaterfallBar, WaterfallLayout,
};

use crate::har::Har;
use serde::Serialize;

/// A pure derivation over a loaded archive.
///
/// Analyzers never fail: empty or partially populated archives degrade to
/// zero/unmeasured values in the output.
pub trait Analyzer {
    type Output;

    fn analyze(&self, har: &Har) -> Self::Output;
}

/// Coarse resource category derived from a response MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Html,
    JavaScript,
    Css,
    Image,
    Json,
    Font,
    Other,
}

impl ResourceType {
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_lowercase();
        if mime.contains("javascript") {
            ResourceType::JavaScript
        } else if mime.contains("css") {
            ResourceType::Css
        } else if mime.contains("image") {
            ResourceType::Image
        } else if mime.contains("html") {
            ResourceType::Html
        } else if mime.contains("json") {
            ResourceType::Json
        } else if mime.contains("font") {
            ResourceType::Font
        } else {
            ResourceType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Html => "html",
            ResourceType::JavaScript => "javascript",
            ResourceType::Css => "css",
            ResourceType::Image => "image",
            ResourceType::Json => "json",
            ResourceType::Font => "font",
            ResourceType::Other => "other",
        }
    }
}

/// Traffic-light grade for headline metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Good,
    Warning,
    Danger,
}

impl Rating {
    pub fn for_load_time(load_time_ms: f64) -> Self {
        if load_time_ms <= 1500.0 {
            Rating::Good
        } else if load_time_ms <= 3000.0 {
            Rating::Warning
        } else {
            Rating::Danger
        }
    }

    pub fn for_ttfb(ttfb_ms: f64) -> Self {
        if ttfb_ms <= 200.0 {
            Rating::Good
        } else if ttfb_ms <= 800.0 {
            Rating::Warning
        } else {
            Rating::Danger
        }
    }

    pub fn for_errors(errors: usize) -> Self {
        match errors {
            0 => Rating::Good,
            1..=5 => Rating::Warning,
            _ => Rating::Danger,
        }
    }
}
