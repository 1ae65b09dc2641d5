//! Dashboard page: headline metrics, recent grades, skills, insights and
//! the SGPA trend.

use maud::{html, Markup};
use tracing::debug;

use super::{failure_message, PageController};
use crate::api::types::DashboardPayload;
use crate::api::ApiClient;
use crate::chart::{ChartSpec, TrendLine};
use crate::format;
use crate::session::{Page, Session};
use crate::view::{self, PageContent, PlacedChart, RenderContext, StudentHeader};

const FALLBACK_ERROR: &str = "Failed to load dashboard data.";
const TREND_CANVAS: &str = "dashboardTrendChart";

/// A recent grade row.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    /// Subject name.
    pub subject: String,
    /// Score display.
    pub score: String,
    /// Letter grade.
    pub grade: String,
    /// Badge classes for the grade.
    pub badge_class: &'static str,
}

/// Dashboard view model.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Student header.
    pub header: StudentHeader,
    /// Current SGPA.
    pub sgpa: String,
    /// SGPA change text and classes.
    pub sgpa_change: (String, &'static str),
    /// Average subject score.
    pub average: String,
    /// 12th-grade percentage.
    pub twelfth: String,
    /// Class rank as an ordinal.
    pub rank: String,
    /// Class size line.
    pub class_size: String,
    /// Latest-semester grades.
    pub recent_grades: Vec<GradeRow>,
    /// Skill names.
    pub skills: Vec<String>,
    /// Insight lines.
    pub insights: Vec<String>,
    /// SGPA trend chart.
    pub trend: Option<PlacedChart>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::from_payload(&DashboardPayload::default())
    }
}

impl DashboardView {
    /// Build the view model from a payload.
    #[must_use]
    pub fn from_payload(payload: &DashboardPayload) -> Self {
        let metrics = payload.metrics.clone().unwrap_or_default();

        let class_size = match metrics.class_size.filter(|n| *n > 0) {
            Some(n) => format!("Out of {n} students"),
            None => "Class size unavailable".to_string(),
        };

        let recent_grades = payload
            .recent_grades
            .iter()
            .map(|g| GradeRow {
                subject: g.subject.clone(),
                score: format!("{}%", format::number(g.score)),
                grade: g.grade.clone(),
                badge_class: format::grade_badge_class(&g.grade),
            })
            .collect();

        let trend = TrendLine::from_points(
            payload
                .progress
                .iter()
                .map(|p| (p.semester.as_str(), p.sgpa)),
        )
        .map(|line| PlacedChart {
            canvas_id: TREND_CANVAS,
            spec: ChartSpec::Trend(line),
        });

        Self {
            header: StudentHeader::from_student(payload.student.as_ref()),
            sgpa: format::sgpa(metrics.current_sgpa),
            sgpa_change: format::sgpa_change(metrics.sgpa_change),
            average: format::percent(metrics.average_subject_score),
            twelfth: format::percent(metrics.twelfth_percentage),
            rank: format::ordinal(metrics.class_rank),
            class_size,
            recent_grades,
            skills: payload.skills.clone(),
            insights: payload.insights.clone(),
            trend,
        }
    }
}

/// Dashboard controller.
#[derive(Debug, Default)]
pub struct DashboardPage {
    view: DashboardView,
    error: Option<String>,
    loaded: bool,
}

impl DashboardPage {
    /// A controller in its pre-load state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view model.
    #[must_use]
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    fn body(&self) -> Markup {
        let model = &self.view;
        let (change_text, change_class) = (model.sgpa_change.0.as_str(), model.sgpa_change.1);

        html! {
            div class="grid gap-4 md:grid-cols-2 xl:grid-cols-4" {
                (view::metric_card("Current SGPA", &model.sgpa, Some((change_text, change_class))))
                (view::metric_card("Average Subject Score", &model.average, None))
                (view::metric_card("12th Percentage", &model.twelfth, None))
                (view::metric_card("Class Rank", &model.rank, Some((model.class_size.as_str(), "mt-2 text-sm text-slate-500"))))
            }
            div class="grid gap-6 xl:grid-cols-3" {
                div class="xl:col-span-2" {
                    (view::section("SGPA Trend", view::chart_canvas(TREND_CANVAS)))
                }
                (view::section("Recent Grades", self.recent_grades()))
            }
            div class="grid gap-6 xl:grid-cols-2" {
                (view::section("Skills", view::skill_pills(&model.skills, "No skills mapped yet.")))
                (view::section("Insights", self.insights()))
            }
        }
    }

    fn recent_grades(&self) -> Markup {
        html! {
            @if self.view.recent_grades.is_empty() {
                (view::placeholder("No subject records in latest semester."))
            } @else {
                div class="space-y-3" {
                    @for row in &self.view.recent_grades {
                        div class="flex items-center justify-between rounded-xl border border-slate-200 p-3" {
                            div {
                                p class="font-semibold" { (row.subject) }
                                p class="text-sm text-slate-500" { "Score: " (row.score) }
                            }
                            span class={ "rounded-full px-3 py-1 text-xs font-semibold " (row.badge_class) } {
                                (row.grade)
                            }
                        }
                    }
                }
            }
        }
    }

    fn insights(&self) -> Markup {
        html! {
            ul class="space-y-2" {
                @if self.view.insights.is_empty() {
                    li class="text-sm text-slate-500" { "No insights available." }
                } @else {
                    @for insight in &self.view.insights {
                        li class="rounded-lg bg-slate-100 px-3 py-2" { (insight) }
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl PageController for DashboardPage {
    fn page(&self) -> Page {
        Page::Dashboard
    }

    async fn load(&mut self, api: &ApiClient, session: &Session) {
        self.error = None;
        match api.dashboard(session.prn()).await {
            Ok(payload) => {
                debug!("Dashboard loaded for {}", session.prn());
                self.view = DashboardView::from_payload(&payload);
                self.loaded = true;
            }
            Err(e) => self.error = Some(failure_message(self.page(), &e, FALLBACK_ERROR)),
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        view::layout(
            ctx,
            PageContent {
                page: self.page(),
                header: &self.view.header,
                error: self.error(),
                charts: self.view.trend.iter().collect(),
                body: self.body(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::pages::testing::{client, context, session};

    const PAYLOAD: &str = r#"{
        "student": {"prn": "PRN01", "name": "Aarav Mehta"},
        "metrics": {
            "current_sgpa": 8.4,
            "sgpa_change": -0.2,
            "twelfth_percentage": 87.25,
            "average_subject_score": 78.5,
            "class_rank": 2,
            "class_size": 60,
            "skills_count": 3
        },
        "recent_grades": [{"subject": "Maths", "score": 91, "grade": "A+"}],
        "skills": ["Python"],
        "insights": ["Strong in Maths"],
        "progress": [
            {"semester": "Sem 1", "sgpa": 6.2},
            {"semester": "Sem 2", "sgpa": null},
            {"semester": "Sem 3", "sgpa": 9.1}
        ]
    }"#;

    #[tokio::test]
    async fn test_load_success() {
        let (api, transport) = client(ScriptedTransport::new().respond(200, PAYLOAD));
        let session = session();
        let mut page = DashboardPage::new();
        page.load(&api, &session).await;

        assert!(page.is_loaded());
        assert_eq!(page.error(), None);
        assert_eq!(
            transport.requests(),
            vec!["http://127.0.0.1:5000/api/student/PRN01/dashboard"]
        );

        let view = page.view();
        assert_eq!(view.header.initials, "AM");
        assert_eq!(view.sgpa, "8.40");
        assert_eq!(view.sgpa_change.0, "-0.20 from previous semester");
        assert_eq!(view.twelfth, "87.3%");
        assert_eq!(view.rank, "2nd");
        assert_eq!(view.class_size, "Out of 60 students");
        assert_eq!(view.recent_grades[0].score, "91%");

        let trend = view.trend.as_ref().unwrap();
        match &trend.spec {
            ChartSpec::Trend(line) => {
                assert_eq!(line.labels, vec!["Sem 1", "Sem 3"]);
                assert_eq!((line.bounds.min, line.bounds.max), (5.0, 10.0));
            }
            other => panic!("unexpected chart {other:?}"),
        }

        let html = page.render(&context(&session)).into_string();
        assert!(html.contains("Aarav Mehta"));
        assert!(html.contains("dashboardTrendChart"));
        assert!(html.contains("Strong in Maths"));
    }

    #[tokio::test]
    async fn test_empty_lists_render_placeholders() {
        let (api, _) = client(
            ScriptedTransport::new().respond(200, r#"{"student":{"prn":"PRN01"},"metrics":{}}"#),
        );
        let session = session();
        let mut page = DashboardPage::new();
        page.load(&api, &session).await;

        let view = page.view();
        assert_eq!(view.class_size, "Class size unavailable");
        assert_eq!(view.rank, "-");
        assert!(view.trend.is_none());

        let html = page.render(&context(&session)).into_string();
        assert!(html.contains("No subject records in latest semester."));
        assert!(html.contains("No skills mapped yet."));
        assert!(html.contains("No insights available."));
        assert!(html.contains("No previous semester to compare"));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_view() {
        let (api, _) = client(
            ScriptedTransport::new()
                .respond(200, PAYLOAD)
                .respond(404, r#"{"error":"Student not found","suggestions":[{"prn":"X1"},{"prn":"X2"}]}"#),
        );
        let session = session();
        let mut page = DashboardPage::new();
        page.load(&api, &session).await;
        let before = page.view().clone();

        page.load(&api, &session).await;
        assert_eq!(page.error(), Some("Student not found. Try one of: X1, X2"));
        assert_eq!(page.view(), &before);

        let html = page.render(&context(&session)).into_string();
        assert!(html.contains("Try one of: X1, X2"));
        assert!(html.contains("8.40"));
    }

    #[tokio::test]
    async fn test_successful_reload_clears_error() {
        let (api, _) = client(
            ScriptedTransport::new()
                .fail("connection refused")
                .respond(200, PAYLOAD),
        );
        let session = session();
        let mut page = DashboardPage::new();

        page.load(&api, &session).await;
        assert_eq!(page.error(), Some("connection refused"));
        assert!(!page.is_loaded());

        page.load(&api, &session).await;
        assert_eq!(page.error(), None);
        assert!(page.is_loaded());
    }
}
