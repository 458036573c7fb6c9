use super::Metrics;
use serde::Serialize;

const NO_CHANGE: &str = "No change";
const BASELINE: &str = "Baseline";
const NOT_AVAILABLE: &str = "N/A";

/// Relative change below which a floating metric counts as unchanged, in percent
const FLOAT_CHANGE_THRESHOLD: f64 = 0.1;

/// The ten metrics a comparison tracks, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    PageLoadTime,
    Ttfb,
    DnsTime,
    ConnectTime,
    SslTime,
    TotalRequests,
    ErrorRequests,
    ThirdPartyRequests,
    CacheHitRatio,
    TotalSize,
}

/// Which way a metric has to move to count as an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    /// Changes are reported but never judged
    Neutral,
}

impl Direction {
    pub fn is_improvement(&self, delta: f64) -> bool {
        match self {
            Direction::LowerIsBetter => delta < 0.0,
            Direction::HigherIsBetter => delta > 0.0,
            Direction::Neutral => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Duration,
    Percentage,
    Count,
    Size,
}

impl MetricId {
    pub const ALL: [MetricId; 10] = [
        MetricId::PageLoadTime,
        MetricId::Ttfb,
        MetricId::DnsTime,
        MetricId::ConnectTime,
        MetricId::SslTime,
        MetricId::TotalRequests,
        MetricId::ErrorRequests,
        MetricId::ThirdPartyRequests,
        MetricId::CacheHitRatio,
        MetricId::TotalSize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricId::PageLoadTime => "Total Load Time",
            MetricId::Ttfb => "Time to First Byte",
            MetricId::DnsTime => "Average DNS Time",
            MetricId::ConnectTime => "Average Connect Time",
            MetricId::SslTime => "Average SSL Time",
            MetricId::TotalRequests => "Total Requests",
            MetricId::ErrorRequests => "Error Requests",
            MetricId::ThirdPartyRequests => "Third-party Requests",
            MetricId::CacheHitRatio => "Cache Hit Ratio",
            MetricId::TotalSize => "Total Transfer Size",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            MetricId::PageLoadTime
            | MetricId::Ttfb
            | MetricId::DnsTime
            | MetricId::ConnectTime
            | MetricId::SslTime
            | MetricId::ErrorRequests
            | MetricId::ThirdPartyRequests
            | MetricId::TotalSize => Direction::LowerIsBetter,
            MetricId::CacheHitRatio => Direction::HigherIsBetter,
            MetricId::TotalRequests => Direction::Neutral,
        }
    }

    fn kind(&self) -> MetricKind {
        match self {
            MetricId::PageLoadTime
            | MetricId::Ttfb
            | MetricId::DnsTime
            | MetricId::ConnectTime
            | MetricId::SslTime => MetricKind::Duration,
            MetricId::CacheHitRatio => MetricKind::Percentage,
            MetricId::TotalRequests | MetricId::ErrorRequests | MetricId::ThirdPartyRequests => {
                MetricKind::Count
            }
            MetricId::TotalSize => MetricKind::Size,
        }
    }

    /// Raw value of this metric; `None` when the metric was never measured
    pub fn value(&self, metrics: &Metrics) -> Option<f64> {
        match self {
            MetricId::PageLoadTime => Some(metrics.page_load_time),
            MetricId::Ttfb => metrics.ttfb,
            MetricId::DnsTime => Some(metrics.dns_time),
            MetricId::ConnectTime => Some(metrics.connect_time),
            MetricId::SslTime => Some(metrics.ssl_time),
            MetricId::TotalRequests => Some(metrics.total_requests as f64),
            MetricId::ErrorRequests => Some(metrics.error_requests as f64),
            MetricId::ThirdPartyRequests => Some(metrics.third_party_requests as f64),
            MetricId::CacheHitRatio => Some(metrics.cache_hit_ratio),
            MetricId::TotalSize => Some(metrics.total_size as f64),
        }
    }

    fn format_value(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return NOT_AVAILABLE.to_string();
        };
        match self.kind() {
            MetricKind::Duration => format!("{:.1}ms", value),
            MetricKind::Percentage => format!("{:.1}%", value),
            MetricKind::Count => format!("{}", value as i64),
            MetricKind::Size => format_size(value as u64),
        }
    }

    fn format_change(&self, delta: f64, percent: f64) -> String {
        let sign = if delta > 0.0 { "+" } else { "" };
        match self.kind() {
            MetricKind::Duration | MetricKind::Percentage => format!("{}{:.1}%", sign, percent),
            MetricKind::Count => format!("{}{} ({}{:.1}%)", sign, delta as i64, sign, percent),
            MetricKind::Size if delta > 0.0 => {
                format!("+{} (+{:.1}%)", format_size(delta as u64), percent)
            }
            MetricKind::Size => format!("-{} ({:.1}%)", format_size((-delta) as u64), percent),
        }
    }
}

/// Classification of one file's value against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Baseline,
    Unchanged,
    Better,
    Worse,
    /// Changed, for a metric with no preferred direction
    Neutral,
    /// Value missing in the baseline or in this file
    Unmeasured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDifference {
    pub metric: MetricId,
    pub name: String,
    /// Display value per file
    pub values: Vec<String>,
    /// Change description per file, `"Baseline"` for file 0
    pub changes: Vec<String>,
    /// Percentage change against the baseline; `None` for the baseline and unmeasured values
    pub percent_changes: Vec<Option<f64>>,
    pub improvements: Vec<bool>,
    pub verdicts: Vec<Verdict>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub better_count: usize,
    pub worse_count: usize,
    pub unchanged_count: usize,
    pub total_metrics: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub files: Vec<String>,
    pub metrics: Vec<Metrics>,
    pub differences: Vec<MetricDifference>,
    pub summary: ComparisonSummary,
}

impl Comparison {
    pub fn difference(&self, metric: MetricId) -> Option<&MetricDifference> {
        self.differences.iter().find(|d| d.metric == metric)
    }

    /// Headline observations about the first file compared against the baseline
    pub fn insights(&self) -> Vec<String> {
        if self.differences.is_empty() {
            return vec!["No insights available".to_string()];
        }

        let mut insights = Vec::new();
        for diff in &self.differences {
            let Some(verdict) = diff.verdicts.get(1) else {
                continue;
            };
            let message = match (diff.metric, verdict) {
                (MetricId::PageLoadTime, Verdict::Better) => "Page load time improved significantly",
                (MetricId::PageLoadTime, Verdict::Worse) => {
                    "Page load time regressed - investigate performance"
                }
                (MetricId::ErrorRequests, Verdict::Better | Verdict::Unchanged) => {
                    "Error rate remained stable or improved"
                }
                (MetricId::ErrorRequests, Verdict::Worse) => {
                    "Error rate increased - check for new issues"
                }
                (MetricId::CacheHitRatio, Verdict::Better) => "Cache efficiency improved",
                (MetricId::CacheHitRatio, Verdict::Worse) => "Cache efficiency decreased",
                (MetricId::TotalSize, Verdict::Better) => "Transfer size optimized",
                (MetricId::TotalSize, Verdict::Worse) => {
                    "Transfer size increased - check for new assets"
                }
                _ => continue,
            };
            insights.push(message.to_string());
        }

        if insights.is_empty() {
            insights.push("Performance appears stable across files".to_string());
        }
        insights
    }
}

pub struct Comparator;

impl Comparator {
    /// Compare every file's metrics against the first file's.
    ///
    /// With fewer than two files there is nothing to compare and the result
    /// carries no differences. Missing labels default to `File N`.
    pub fn compare(mut files: Vec<String>, metrics: Vec<Metrics>) -> Comparison {
        tracing::debug!("Comparing metrics across {} files", metrics.len());

        files.truncate(metrics.len());
        for i in files.len()..metrics.len() {
            files.push(format!("File {}", i + 1));
        }

        if metrics.len() < 2 {
            return Comparison {
                files,
                metrics,
                differences: Vec::new(),
                summary: ComparisonSummary::default(),
            };
        }

        let differences: Vec<MetricDifference> = MetricId::ALL
            .iter()
            .map(|metric| Self::difference(*metric, &metrics))
            .collect();
        let summary = Self::summarize(&differences);

        tracing::info!(
            "Comparison complete: {} better, {} worse, {} unchanged",
            summary.better_count,
            summary.worse_count,
            summary.unchanged_count
        );

        Comparison {
            files,
            metrics,
            differences,
            summary,
        }
    }

    fn difference(metric: MetricId, metrics: &[Metrics]) -> MetricDifference {
        let baseline = metric.value(&metrics[0]);

        let mut diff = MetricDifference {
            metric,
            name: metric.name().to_string(),
            values: Vec::with_capacity(metrics.len()),
            changes: Vec::with_capacity(metrics.len()),
            percent_changes: Vec::with_capacity(metrics.len()),
            improvements: Vec::with_capacity(metrics.len()),
            verdicts: Vec::with_capacity(metrics.len()),
        };

        for (i, file_metrics) in metrics.iter().enumerate() {
            let value = metric.value(file_metrics);
            diff.values.push(metric.format_value(value));

            if i == 0 {
                diff.changes.push(BASELINE.to_string());
                diff.percent_changes.push(None);
                diff.improvements.push(false);
                diff.verdicts.push(Verdict::Baseline);
                continue;
            }

            let (Some(base), Some(value)) = (baseline, value) else {
                diff.changes.push(NOT_AVAILABLE.to_string());
                diff.percent_changes.push(None);
                diff.improvements.push(false);
                diff.verdicts.push(Verdict::Unmeasured);
                continue;
            };

            let delta = value - base;
            let percent = if base == 0.0 { 0.0 } else { delta * 100.0 / base };
            diff.percent_changes.push(Some(percent));

            // Floats compare by percentage, which is 0 against a zero baseline;
            // counts and sizes compare by raw delta
            let unchanged = match metric.kind() {
                MetricKind::Duration | MetricKind::Percentage => {
                    percent.abs() < FLOAT_CHANGE_THRESHOLD
                }
                _ => delta == 0.0,
            };

            if unchanged {
                diff.changes.push(NO_CHANGE.to_string());
                diff.improvements.push(false);
                diff.verdicts.push(Verdict::Unchanged);
                continue;
            }

            let direction = metric.direction();
            let improvement = direction.is_improvement(delta);
            diff.changes.push(metric.format_change(delta, percent));
            diff.improvements.push(improvement);
            diff.verdicts.push(match direction {
                Direction::Neutral => Verdict::Neutral,
                _ if improvement => Verdict::Better,
                _ => Verdict::Worse,
            });
        }

        diff
    }

    /// Tally every non-baseline column. A change that is not an improvement
    /// counts as worse, neutral metrics included.
    fn summarize(differences: &[MetricDifference]) -> ComparisonSummary {
        let mut summary = ComparisonSummary::default();

        for verdict in differences.iter().flat_map(|d| d.verdicts.iter().skip(1)) {
            match verdict {
                Verdict::Better => summary.better_count += 1,
                Verdict::Worse | Verdict::Neutral => summary.worse_count += 1,
                Verdict::Unchanged | Verdict::Unmeasured => summary.unchanged_count += 1,
                Verdict::Baseline => {}
            }
        }

        summary.total_metrics = summary.better_count + summary.worse_count + summary.unchanged_count;
        summary
    }
}

/// Roll-up over every loaded file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_files: usize,
    pub total_requests: usize,
    pub total_errors: usize,
    pub average_load_time: f64,
    /// Mean over the files that measured a TTFB
    pub average_ttfb: Option<f64>,
    pub total_transfer_mb: f64,
}

impl AggregateSummary {
    pub fn from_metrics(metrics: &[Metrics]) -> Self {
        if metrics.is_empty() {
            return Self::default();
        }

        let ttfbs: Vec<f64> = metrics.iter().filter_map(|m| m.ttfb).collect();
        let average_ttfb =
            (!ttfbs.is_empty()).then(|| ttfbs.iter().sum::<f64>() / ttfbs.len() as f64);

        Self {
            total_files: metrics.len(),
            total_requests: metrics.iter().map(|m| m.total_requests).sum(),
            total_errors: metrics.iter().map(|m| m.error_requests).sum(),
            average_load_time: metrics.iter().map(|m| m.page_load_time).sum::<f64>()
                / metrics.len() as f64,
            average_ttfb,
            total_transfer_mb: metrics.iter().map(|m| m.total_size as f64).sum::<f64>()
                / (1024.0 * 1024.0),
        }
    }
}

/// Human-readable byte count: `512B`, `1.5KB`, `2.0MB`
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> Metrics {
        Metrics {
            total_requests: 40,
            total_time: 5200.0,
            total_size: 2 * 1024 * 1024,
            ttfb: Some(120.0),
            page_load_time: 2500.0,
            dns_time: 12.0,
            connect_time: 20.0,
            ssl_time: 15.0,
            cache_hit_ratio: 25.0,
            third_party_requests: 6,
            error_requests: 0,
            ..Default::default()
        }
    }

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("run-{}.har", i)).collect()
    }

    #[test]
    fn test_single_file_has_no_differences() {
        let comparison = Comparator::compare(labels(1), vec![sample_metrics()]);

        assert!(comparison.differences.is_empty());
        assert_eq!(comparison.summary, ComparisonSummary::default());
        assert_eq!(comparison.summary.total_metrics, 0);
        assert_eq!(comparison.files, ["run-0.har"]);
    }

    #[test]
    fn test_no_files_is_empty() {
        let comparison = Comparator::compare(Vec::new(), Vec::new());

        assert!(comparison.files.is_empty());
        assert!(comparison.differences.is_empty());
    }

    #[test]
    fn test_load_time_improvement() {
        let mut after = sample_metrics();
        after.page_load_time = 1800.0;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::PageLoadTime).unwrap();

        assert_eq!(diff.name, "Total Load Time");
        assert_eq!(diff.values, ["2500.0ms", "1800.0ms"]);
        assert_eq!(diff.changes, ["Baseline", "-28.0%"]);
        assert_eq!(diff.percent_changes, [None, Some(-28.0)]);
        assert_eq!(diff.improvements, [false, true]);
        assert_eq!(diff.verdicts[1], Verdict::Better);
        assert_eq!(comparison.summary.better_count, 1);
        assert_eq!(comparison.summary.unchanged_count, 9);
    }

    #[test]
    fn test_errors_from_zero_baseline_are_worse() {
        let mut after = sample_metrics();
        after.error_requests = 2;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::ErrorRequests).unwrap();

        assert_eq!(diff.values, ["0", "2"]);
        assert_eq!(diff.changes[1], "+2 (+0.0%)");
        assert_eq!(diff.percent_changes[1], Some(0.0));
        assert!(!diff.improvements[1]);
        assert_eq!(diff.verdicts[1], Verdict::Worse);
        assert_eq!(comparison.summary.worse_count, 1);
    }

    #[test]
    fn test_identical_metrics_are_all_unchanged() {
        let comparison =
            Comparator::compare(labels(2), vec![sample_metrics(), sample_metrics()]);

        assert_eq!(comparison.differences.len(), 10);
        assert_eq!(comparison.summary.unchanged_count, 10);
        assert_eq!(comparison.summary.better_count, 0);
        assert_eq!(comparison.summary.worse_count, 0);
        assert_eq!(comparison.summary.total_metrics, 10);
        assert!(comparison.differences.iter().all(|d| d.changes[1] == "No change"));
    }

    #[test]
    fn test_every_file_is_relative_to_baseline() {
        let mut second = sample_metrics();
        second.page_load_time = 2000.0;
        let mut third = sample_metrics();
        third.page_load_time = 3000.0;

        let comparison =
            Comparator::compare(labels(3), vec![sample_metrics(), second, third]);
        let diff = comparison.difference(MetricId::PageLoadTime).unwrap();

        assert_eq!(diff.changes, ["Baseline", "-20.0%", "+20.0%"]);
        assert_eq!(diff.improvements, [false, true, false]);
        assert_eq!(comparison.summary.total_metrics, 20);
        assert_eq!(comparison.summary.better_count, 1);
        assert_eq!(comparison.summary.worse_count, 1);
    }

    #[test]
    fn test_small_float_change_is_no_change() {
        let mut after = sample_metrics();
        after.page_load_time = 2501.0; // +0.04%

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::PageLoadTime).unwrap();

        assert_eq!(diff.changes[1], "No change");
        assert_eq!(diff.verdicts[1], Verdict::Unchanged);
    }

    #[test]
    fn test_cache_hit_ratio_higher_is_better() {
        let mut after = sample_metrics();
        after.cache_hit_ratio = 50.0;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::CacheHitRatio).unwrap();

        assert_eq!(diff.values, ["25.0%", "50.0%"]);
        assert_eq!(diff.changes[1], "+100.0%");
        assert!(diff.improvements[1]);
    }

    #[test]
    fn test_cache_hit_ratio_from_zero_baseline_is_unchanged() {
        let mut before = sample_metrics();
        before.cache_hit_ratio = 0.0;
        let after = sample_metrics();

        let comparison = Comparator::compare(labels(2), vec![before, after]);
        let diff = comparison.difference(MetricId::CacheHitRatio).unwrap();

        assert_eq!(diff.changes[1], "No change");
        assert_eq!(diff.percent_changes[1], Some(0.0));
        assert_eq!(diff.verdicts[1], Verdict::Unchanged);
    }

    #[test]
    fn test_ssl_time_from_zero_baseline_is_unchanged() {
        let mut before = sample_metrics();
        before.ssl_time = 0.0;
        let mut after = sample_metrics();
        after.ssl_time = 5.0;

        let comparison = Comparator::compare(labels(2), vec![before, after]);
        let diff = comparison.difference(MetricId::SslTime).unwrap();

        assert_eq!(diff.changes[1], "No change");
        assert_eq!(comparison.summary.unchanged_count, 10);
        assert_eq!(comparison.summary.worse_count, 0);
    }

    #[test]
    fn test_smaller_transfer_size_is_better() {
        let mut after = sample_metrics();
        after.total_size = 1024 * 1024;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::TotalSize).unwrap();

        assert_eq!(diff.values, ["2.0MB", "1.0MB"]);
        assert_eq!(diff.changes[1], "-1.0MB (-50.0%)");
        assert!(diff.improvements[1]);
    }

    #[test]
    fn test_larger_transfer_size_is_worse() {
        let mut after = sample_metrics();
        after.total_size += 512;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::TotalSize).unwrap();

        assert_eq!(diff.changes[1], "+512B (+0.0%)");
        assert_eq!(diff.verdicts[1], Verdict::Worse);
    }

    #[test]
    fn test_total_requests_is_neutral() {
        let mut after = sample_metrics();
        after.total_requests = 30;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::TotalRequests).unwrap();

        assert_eq!(diff.changes[1], "-10 (-25.0%)");
        assert!(!diff.improvements[1]);
        assert_eq!(diff.verdicts[1], Verdict::Neutral);
        assert_eq!(MetricId::TotalRequests.direction(), Direction::Neutral);
        // Neutral changes are tallied with the regressions
        assert_eq!(comparison.summary.worse_count, 1);
    }

    #[test]
    fn test_unmeasured_ttfb_is_not_compared() {
        let mut after = sample_metrics();
        after.ttfb = None;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        let diff = comparison.difference(MetricId::Ttfb).unwrap();

        assert_eq!(diff.values, ["120.0ms", "N/A"]);
        assert_eq!(diff.changes[1], "N/A");
        assert_eq!(diff.verdicts[1], Verdict::Unmeasured);
        assert_eq!(comparison.summary.unchanged_count, 10);
    }

    #[test]
    fn test_missing_labels_are_filled_in() {
        let comparison = Comparator::compare(
            vec!["before.har".to_string()],
            vec![sample_metrics(), sample_metrics()],
        );

        assert_eq!(comparison.files, ["before.har", "File 2"]);
    }

    #[test]
    fn test_direction_table() {
        for metric in MetricId::ALL {
            let expected = match metric {
                MetricId::CacheHitRatio => Direction::HigherIsBetter,
                MetricId::TotalRequests => Direction::Neutral,
                _ => Direction::LowerIsBetter,
            };
            assert_eq!(metric.direction(), expected, "{:?}", metric);
        }
    }

    #[test]
    fn test_insights() {
        let mut after = sample_metrics();
        after.page_load_time = 3000.0;
        after.error_requests = 3;
        after.cache_hit_ratio = 40.0;
        after.total_size = 1024;

        let comparison = Comparator::compare(labels(2), vec![sample_metrics(), after]);

        assert_eq!(
            comparison.insights(),
            [
                "Page load time regressed - investigate performance",
                "Error rate increased - check for new issues",
                "Cache efficiency improved",
                "Transfer size optimized",
            ]
        );
    }

    #[test]
    fn test_insights_fallbacks() {
        let single = Comparator::compare(labels(1), vec![sample_metrics()]);
        assert_eq!(single.insights(), ["No insights available"]);

        let mut after = sample_metrics();
        after.error_requests = 0;
        after.dns_time = 40.0;
        let stable = Comparator::compare(labels(2), vec![sample_metrics(), after]);
        assert_eq!(stable.insights(), ["Error rate remained stable or improved"]);
    }

    #[test]
    fn test_aggregate_summary() {
        let mut second = sample_metrics();
        second.page_load_time = 1500.0;
        second.ttfb = None;
        second.error_requests = 4;

        let summary = AggregateSummary::from_metrics(&[sample_metrics(), second]);

        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.total_requests, 80);
        assert_eq!(summary.total_errors, 4);
        assert_eq!(summary.average_load_time, 2000.0);
        assert_eq!(summary.average_ttfb, Some(120.0));
        assert_eq!(summary.total_transfer_mb, 4.0);
        assert_eq!(AggregateSummary::from_metrics(&[]), AggregateSummary::default());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * 1024 * 1024 / 2), "2.5MB");
    }
}
