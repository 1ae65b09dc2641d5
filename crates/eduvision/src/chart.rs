//! Chart specifications.
//!
//! Pages describe their charts with the typed specs below; each spec turns
//! into a Chart.js configuration object that the page embeds in a script.

use serde::Serialize;
use serde_json::{json, Value};

/// Padding added below the minimum and above the maximum grade point.
pub const GRADE_POINT_MARGIN: f64 = 0.8;

/// Natural bounds of a grade-point scale.
pub const GRADE_POINT_DOMAIN: (f64, f64) = (0.0, 10.0);

/// Natural bounds of a percentage scale.
pub const PERCENT_DOMAIN: (f64, f64) = (0.0, 100.0);

const SERIES_COLOR: &str = "#2563eb";

/// Y-axis bounds of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl AxisBounds {
    /// Bounds derived from the data's min/max padded by `margin`, rounded
    /// outward to whole units and clamped to `domain`.
    ///
    /// With no finite values the domain itself stands in for min and max.
    #[must_use]
    pub fn padded(values: &[f64], margin: f64, domain: (f64, f64)) -> Self {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), v| {
            (
                Some(lo.map_or(v, |l| l.min(v))),
                Some(hi.map_or(v, |h| h.max(v))),
            )
        });
        let lo = lo.unwrap_or(domain.0);
        let hi = hi.unwrap_or(domain.1);

        Self {
            min: (lo - margin).floor().max(domain.0),
            max: (hi + margin).ceil().min(domain.1),
        }
    }

    /// Bounds for a grade-point series.
    ///
    /// ```
    /// use eduvision::chart::AxisBounds;
    ///
    /// let bounds = AxisBounds::grade_points(&[6.2, 7.8, 9.1]);
    /// assert_eq!((bounds.min, bounds.max), (5.0, 10.0));
    /// ```
    #[must_use]
    pub fn grade_points(values: &[f64]) -> Self {
        Self::padded(values, GRADE_POINT_MARGIN, GRADE_POINT_DOMAIN)
    }
}

/// Mean of a series rounded to two decimals, 0 for an empty series.
#[must_use]
pub fn rounded_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean * 100.0).round() / 100.0
}

/// SGPA trend line (dashboard).
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    /// Semester labels.
    pub labels: Vec<String>,
    /// SGPA per semester.
    pub values: Vec<f64>,
    /// Y-axis bounds.
    pub bounds: AxisBounds,
}

/// Subject radar on a 0-100 scale (progress, 12th marks).
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRadar {
    /// Subject labels.
    pub labels: Vec<String>,
    /// Scores per subject.
    pub values: Vec<f64>,
}

/// SGPA bars with a dashed overall-average line (progress).
#[derive(Debug, Clone, PartialEq)]
pub struct AverageBars {
    /// Semester labels.
    pub labels: Vec<String>,
    /// SGPA per semester; missing values leave a gap.
    pub values: Vec<Option<f64>>,
    /// Mean of the present values, two decimals.
    pub average: f64,
    /// Y-axis bounds.
    pub bounds: AxisBounds,
}

/// A chart a page can draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// Line chart.
    Trend(TrendLine),
    /// Radar chart.
    Radar(SubjectRadar),
    /// Bar chart with an average line.
    Bars(AverageBars),
}

impl TrendLine {
    /// Build a trend from `(label, sgpa)` points, skipping missing values.
    ///
    /// Returns `None` when no point has a value.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = (&'a str, Option<f64>)>) -> Option<Self> {
        let (labels, values): (Vec<String>, Vec<f64>) = points
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| (label.to_string(), v)))
            .unzip();
        if values.is_empty() {
            return None;
        }
        let bounds = AxisBounds::grade_points(&values);
        Some(Self {
            labels,
            values,
            bounds,
        })
    }
}

impl SubjectRadar {
    /// Build a radar when both labels and scores are present.
    #[must_use]
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Option<Self> {
        if labels.is_empty() || values.is_empty() {
            return None;
        }
        Some(Self { labels, values })
    }
}

impl AverageBars {
    /// Build bars from `(label, sgpa)` points.
    ///
    /// Returns `None` for an empty series; a series of only missing values
    /// still draws, with bounds from the full grade-point scale.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = (&'a str, Option<f64>)>) -> Option<Self> {
        let (labels, values): (Vec<String>, Vec<Option<f64>>) = points
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .unzip();
        if labels.is_empty() {
            return None;
        }
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        Some(Self {
            labels,
            average: rounded_mean(&present),
            bounds: AxisBounds::grade_points(&present),
            values,
        })
    }
}

impl ChartSpec {
    /// The Chart.js configuration for this chart.
    #[must_use]
    pub fn config(&self) -> Value {
        match self {
            Self::Trend(line) => json!({
                "type": "line",
                "data": {
                    "labels": line.labels,
                    "datasets": [{
                        "label": "SGPA",
                        "data": line.values,
                        "borderColor": SERIES_COLOR,
                        "backgroundColor": "rgba(37,99,235,0.1)",
                        "borderWidth": 3,
                        "pointRadius": 4,
                        "pointBackgroundColor": SERIES_COLOR,
                        "tension": 0.3,
                        "fill": true,
                    }],
                },
                "options": {
                    "responsive": true,
                    "maintainAspectRatio": false,
                    "scales": {
                        "y": {
                            "min": line.bounds.min,
                            "max": line.bounds.max,
                            "ticks": { "stepSize": 0.5 },
                            "grid": { "color": "rgba(148,163,184,0.2)" },
                        },
                        "x": { "grid": { "color": "rgba(148,163,184,0.15)" } },
                    },
                    "plugins": { "legend": { "display": false } },
                },
            }),
            Self::Radar(radar) => json!({
                "type": "radar",
                "data": {
                    "labels": radar.labels,
                    "datasets": [{
                        "label": "12th Marks",
                        "data": radar.values,
                        "borderColor": SERIES_COLOR,
                        "backgroundColor": "rgba(37,99,235,0.2)",
                        "borderWidth": 2,
                        "pointBackgroundColor": SERIES_COLOR,
                    }],
                },
                "options": {
                    "responsive": true,
                    "maintainAspectRatio": false,
                    "scales": {
                        "r": {
                            "min": PERCENT_DOMAIN.0,
                            "max": PERCENT_DOMAIN.1,
                            "ticks": { "stepSize": 20 },
                            "grid": { "color": "rgba(148,163,184,0.3)" },
                        },
                    },
                    "plugins": { "legend": { "display": false } },
                },
            }),
            Self::Bars(bars) => json!({
                "type": "bar",
                "data": {
                    "labels": bars.labels,
                    "datasets": [
                        {
                            "label": "SGPA",
                            "data": bars.values,
                            "backgroundColor": SERIES_COLOR,
                            "borderRadius": 8,
                        },
                        {
                            "type": "line",
                            "label": "Average SGPA",
                            "data": vec![bars.average; bars.labels.len()],
                            "borderColor": "#0f172a",
                            "borderDash": [6, 5],
                            "borderWidth": 2,
                            "pointRadius": 0,
                        },
                    ],
                },
                "options": {
                    "responsive": true,
                    "maintainAspectRatio": false,
                    "scales": {
                        "y": {
                            "min": bars.bounds.min,
                            "max": bars.bounds.max,
                            "ticks": { "stepSize": 0.5 },
                            "grid": { "color": "rgba(148,163,184,0.25)" },
                        },
                        "x": { "grid": { "display": false } },
                    },
                    "plugins": { "legend": { "display": false } },
                },
            }),
        }
    }

    /// Script that draws this chart into the canvas with id `canvas_id`.
    ///
    /// Every `<` is written as `\u003c`, so labels can neither close the
    /// surrounding script element nor open a comment inside it.
    #[must_use]
    pub fn script(&self, canvas_id: &str) -> String {
        let config = escape_script_json(&self.config().to_string());
        let id = escape_script_json(&Value::from(canvas_id).to_string());
        format!("new Chart(document.getElementById({id}), {config});")
    }
}

/// `<` only occurs inside JSON strings, where `\u003c` decodes to the same text.
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}
