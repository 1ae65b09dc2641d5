//! Progress page: subject progress against targets, 12th-grade radar,
//! SGPA bars, skills and goals.

use maud::{html, Markup};
use tracing::debug;

use super::{failure_message, PageController};
use crate::api::types::ProgressPayload;
use crate::api::ApiClient;
use crate::chart::{AverageBars, ChartSpec, SubjectRadar};
use crate::format;
use crate::session::{Page, Session};
use crate::view::{self, PageContent, PlacedChart, RenderContext, StudentHeader};

const FALLBACK_ERROR: &str = "Failed to load progress data.";
const SEMESTER_PLACEHOLDER: &str = "Semester -";
const RADAR_CANVAS: &str = "skillsRadarChart";
const BARS_CANVAS: &str = "sgpaBarChart";

/// A subject progress card.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCard {
    /// Subject name.
    pub subject: String,
    /// Current score.
    pub score: f64,
    /// Target score.
    pub target: f64,
    /// Humanized status.
    pub status: String,
    /// Chip classes for the status.
    pub status_class: &'static str,
}

/// A goal card.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCard {
    /// Goal title.
    pub title: String,
    /// Humanized status.
    pub status: String,
    /// Chip classes for the status.
    pub status_class: &'static str,
    /// Current score.
    pub current: f64,
    /// Target score.
    pub target: f64,
}

/// Progress view model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// Student header.
    pub header: StudentHeader,
    /// Current semester chip.
    pub semester: String,
    /// Subject cards.
    pub subjects: Vec<SubjectCard>,
    /// 12th-grade marks radar.
    pub radar: Option<PlacedChart>,
    /// SGPA bars.
    pub bars: Option<PlacedChart>,
    /// Skill names.
    pub skills: Vec<String>,
    /// Goal cards.
    pub goals: Vec<GoalCard>,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self::from_payload(&ProgressPayload::default())
    }
}

impl ProgressView {
    /// Build the view model from a payload.
    #[must_use]
    pub fn from_payload(payload: &ProgressPayload) -> Self {
        let subjects = payload
            .subjects
            .iter()
            .map(|s| SubjectCard {
                subject: s.subject.clone(),
                score: s.score,
                target: s.target_score,
                status: format::humanize(&s.status),
                status_class: format::status_chip_class(&s.status),
            })
            .collect();

        let radar = payload
            .twelfth_radar
            .as_ref()
            .and_then(|r| SubjectRadar::new(r.labels.clone(), r.scores.clone()))
            .map(|radar| PlacedChart {
                canvas_id: RADAR_CANVAS,
                spec: ChartSpec::Radar(radar),
            });

        let bars = AverageBars::from_points(
            payload
                .sgpa_trend
                .iter()
                .map(|p| (p.semester.as_str(), p.sgpa)),
        )
        .map(|bars| PlacedChart {
            canvas_id: BARS_CANVAS,
            spec: ChartSpec::Bars(bars),
        });

        let goals = payload
            .goals
            .iter()
            .map(|g| GoalCard {
                title: g.title.clone(),
                status: format::humanize(&g.status),
                status_class: format::goal_status_chip_class(&g.status),
                current: g.current_score,
                target: g.target_score,
            })
            .collect();

        Self {
            header: StudentHeader::from_student(payload.student.as_ref()),
            semester: payload
                .current_semester
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| SEMESTER_PLACEHOLDER.to_string()),
            subjects,
            radar,
            bars,
            skills: payload.skills.clone(),
            goals,
        }
    }
}

/// Progress controller.
#[derive(Debug, Default)]
pub struct ProgressPage {
    view: ProgressView,
    error: Option<String>,
    loaded: bool,
}

impl ProgressPage {
    /// A controller in its pre-load state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view model.
    #[must_use]
    pub fn view(&self) -> &ProgressView {
        &self.view
    }

    fn body(&self) -> Markup {
        let model = &self.view;
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold" { "Academic Progress" }
                span id="currentSemesterChip" class="rounded-full bg-blue-100 px-4 py-1 text-sm font-semibold text-blue-700" {
                    (model.semester)
                }
            }
            div class="grid gap-6 xl:grid-cols-2" {
                (view::section("Subject Progress", self.subjects()))
                (view::section("12th Marks", view::chart_canvas(RADAR_CANVAS)))
            }
            (view::section("SGPA by Semester", view::chart_canvas(BARS_CANVAS)))
            div class="grid gap-6 xl:grid-cols-2" {
                (view::section("Skills", view::skill_pills(&model.skills, "No skills available for this PRN.")))
                (view::section("Goals", self.goals()))
            }
        }
    }

    fn subjects(&self) -> Markup {
        html! {
            @if self.view.subjects.is_empty() {
                (view::placeholder("No semester subject data found for this PRN."))
            } @else {
                div class="space-y-3" {
                    @for card in &self.view.subjects {
                        div class="rounded-xl border border-slate-200 p-4" {
                            div class="mb-2 flex items-center justify-between gap-3" {
                                div {
                                    p class="text-lg font-semibold" { (card.subject) }
                                    p class="text-sm text-slate-500" {
                                        "Current: " (format::number(card.score)) "% | Target: " (format::number(card.target)) "%"
                                    }
                                }
                                span class={ "rounded-full px-3 py-1 text-xs font-semibold " (card.status_class) } {
                                    (card.status)
                                }
                            }
                            (view::progress_bar(card.score))
                        }
                    }
                }
            }
        }
    }

    fn goals(&self) -> Markup {
        html! {
            @if self.view.goals.is_empty() {
                (view::placeholder("No goals generated yet."))
            } @else {
                div class="space-y-3" {
                    @for goal in &self.view.goals {
                        div class="rounded-xl border border-slate-200 p-4" {
                            div class="mb-2 flex items-start justify-between gap-3" {
                                p class="font-semibold" { (goal.title) }
                                span class={ "rounded-full px-3 py-1 text-xs font-semibold " (goal.status_class) } {
                                    (goal.status)
                                }
                            }
                            p class="text-sm text-slate-600" {
                                "Current: " (format::number(goal.current)) "% | Target: " (format::number(goal.target)) "%"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl PageController for ProgressPage {
    fn page(&self) -> Page {
        Page::Progress
    }

    async fn load(&mut self, api: &ApiClient, session: &Session) {
        self.error = None;
        match api.progress(session.prn()).await {
            Ok(payload) => {
                debug!("Progress loaded for {}", session.prn());
                self.view = ProgressView::from_payload(&payload);
                self.loaded = true;
            }
            Err(e) => {
                self.error = Some(failure_message(self.page(), &e, FALLBACK_ERROR));
                self.view.semester = SEMESTER_PLACEHOLDER.to_string();
            }
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
                charts: self.view.radar.iter().chain(self.view.bars.iter()).collect(),
                body: self.body(),
            },
        )
    }
}
