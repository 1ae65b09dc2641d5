//! Improvement page: recommendation summary, AI source notice, focus areas,
//! recommended actions and the six-week plan.

use maud::{html, Markup};
use tracing::{debug, info};

use super::{failure_message, PageController};
use crate::api::types::{FocusArea, ImprovementPayload, PlanStage, Recommendation};
use crate::api::ApiClient;
use crate::format;
use crate::session::{Page, Session};
use crate::view::{self, PageContent, RenderContext, StudentHeader};

const FALLBACK_ERROR: &str = "Failed to load improvement data.";
const SUMMARY_FALLBACK: &str = "No recommendation summary available for this student.";
const GEMINI_SOURCE: &str = "gemini";
const GEMINI_SUCCESS: &str = "gemini_success";

const SUCCESS_NOTICE_CLASS: &str =
    "rounded-xl border border-emerald-200 bg-emerald-50 px-4 py-3 text-sm text-emerald-700";
const FALLBACK_NOTICE_CLASS: &str =
    "rounded-xl border border-amber-200 bg-amber-50 px-4 py-3 text-sm text-amber-700";

/// Which engine produced the recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Generated by the Gemini API.
    Gemini,
    /// Produced by the server's rule-based fallback.
    RuleBased,
}

impl Source {
    fn from_payload(source: Option<&str>) -> Self {
        if source == Some(GEMINI_SOURCE) {
            Self::Gemini
        } else {
            Self::RuleBased
        }
    }

    /// Tag text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gemini => "Source: Gemini API",
            Self::RuleBased => "Source: Rule-based fallback",
        }
    }

    /// Tag classes.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Gemini => {
                "inline-flex rounded-full bg-emerald-100 px-3 py-1 text-xs font-semibold text-emerald-700"
            }
            Self::RuleBased => {
                "inline-flex rounded-full bg-amber-100 px-3 py-1 text-xs font-semibold text-amber-700"
            }
        }
    }
}

/// Notice about how the AI request went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiNotice {
    /// The AI response was used.
    Success,
    /// The fallback was used, with the AI error when one was reported.
    Fallback(Option<String>),
}

impl AiNotice {
    fn from_payload(payload: &ImprovementPayload) -> Self {
        if payload.ai_status.as_deref() == Some(GEMINI_SUCCESS) {
            Self::Success
        } else {
            Self::Fallback(payload.ai_error.clone().filter(|e| !e.is_empty()))
        }
    }

    /// Notice text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Success => {
                "Gemini response loaded successfully from your configured API key.".to_string()
            }
            Self::Fallback(Some(error)) => format!("Gemini fallback used: {error}"),
            Self::Fallback(None) => {
                "Gemini fallback used. Configure GEMINI_API_KEY for AI-generated recommendations."
                    .to_string()
            }
        }
    }

    fn class(&self) -> &'static str {
        match self {
            Self::Success => SUCCESS_NOTICE_CLASS,
            Self::Fallback(_) => FALLBACK_NOTICE_CLASS,
        }
    }
}

/// Improvement view model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementView {
    /// Student header.
    pub header: StudentHeader,
    /// Summary paragraph.
    pub summary: String,
    /// Recommendation source.
    pub source: Source,
    /// AI notice; cleared by a failed load.
    pub notice: Option<AiNotice>,
    /// Focus areas.
    pub focus_areas: Vec<FocusArea>,
    /// Recommended actions.
    pub recommendations: Vec<Recommendation>,
    /// Six-week plan stages.
    pub plan: Vec<PlanStage>,
    /// Recommendations started counter.
    pub recommendations_started: u32,
    /// Skills counter.
    pub skills_count: u32,
}

impl Default for ImprovementView {
    fn default() -> Self {
        Self {
            notice: None,
            ..Self::from_payload(&ImprovementPayload::default())
        }
    }
}

impl ImprovementView {
    /// Build the view model from a payload.
    #[must_use]
    pub fn from_payload(payload: &ImprovementPayload) -> Self {
        let started = payload.recommendations_started.unwrap_or_else(|| {
            u32::try_from(payload.recommendations.len()).unwrap_or(u32::MAX)
        });

        Self {
            header: StudentHeader::from_student(payload.student.as_ref()),
            summary: payload
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()),
            source: Source::from_payload(payload.source.as_deref()),
            notice: Some(AiNotice::from_payload(payload)),
            focus_areas: payload.focus_areas.clone(),
            recommendations: payload.recommendations.clone(),
            plan: payload.six_week_plan.clone(),
            recommendations_started: started,
            skills_count: payload.skills_count.unwrap_or(0),
        }
    }
}

/// Improvement controller.
#[derive(Debug, Default)]
pub struct ImprovementPage {
    view: ImprovementView,
    error: Option<String>,
    loaded: bool,
}

impl ImprovementPage {
    /// A controller in its pre-load state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view model.
    #[must_use]
    pub fn view(&self) -> &ImprovementView {
        &self.view
    }

    /// Re-run the load on user request.
    pub async fn refresh(&mut self, api: &ApiClient, session: &Session) {
        info!("Refreshing recommendations for {}", session.prn());
        self.load(api, session).await;
    }

    fn body(&self) -> Markup {
        let model = &self.view;
        html! {
            section class="rounded-2xl border border-slate-200 bg-white p-5" {
                div class="mb-3 flex flex-wrap items-center justify-between gap-3" {
                    h1 class="text-3xl font-bold" { "Improvement Plan" }
                    span id="aiSourceTag" class=(model.source.class()) { (model.source.label()) }
                }
                p id="improvementSummary" class="text-slate-600" { (model.summary) }
                div id="aiNotice" class="mt-4" {
                    @if let Some(notice) = &model.notice {
                        div class=(notice.class()) { (notice.message()) }
                    }
                }
            }
            div class="grid gap-4 md:grid-cols-3" {
                (view::metric_card("Recommendations Started", &model.recommendations_started.to_string(), None))
                (view::metric_card("Skills Mapped", &model.skills_count.to_string(), None))
                (view::metric_card("Plan Stages", &model.plan.len().to_string(), None))
            }
            div class="grid gap-4 md:grid-cols-2" { (self.focus_areas()) }
            (view::section("Recommended Actions", self.recommendations()))
            (view::section("6-Week Plan", self.plan()))
        }
    }

    fn focus_areas(&self) -> Markup {
        html! {
            @if self.view.focus_areas.is_empty() {
                article class="rounded-2xl border border-slate-200 bg-white p-5 text-sm text-slate-500" {
                    "No focus areas detected from latest semester records."
                }
            } @else {
                @for focus in &self.view.focus_areas {
                    article class="rounded-2xl border border-slate-200 bg-white p-5" {
                        div class="mb-3 flex items-center justify-between gap-3" {
                            h3 class="text-2xl font-semibold" { (focus.subject) }
                            span class={ "rounded-full px-3 py-1 text-xs font-semibold " (format::priority_pill_class(&focus.priority)) } {
                                (focus.priority) " priority"
                            }
                        }
                        p class="text-slate-500" { (focus.reason) }
                        div class="mt-4 flex items-center justify-between text-sm" {
                            span { "Current: " (format::optional_number(focus.current_score)) "%" }
                            span { "Target: " (format::optional_number(focus.target_score)) "%" }
                        }
                        div class="mt-2" { (view::progress_bar(focus.current_score.unwrap_or(0.0))) }
                        p class="mt-2 text-sm text-slate-500" { (format::optional_number(focus.gap)) " points to goal" }
                    }
                }
            }
        }
    }

    fn recommendations(&self) -> Markup {
        html! {
            @if self.view.recommendations.is_empty() {
                article class="rounded-xl border border-slate-200 p-4 text-sm text-slate-500" {
                    "No recommendation actions available."
                }
            } @else {
                div class="grid gap-4 md:grid-cols-2" {
                    @for item in &self.view.recommendations {
                        article class="rounded-xl border border-slate-200 p-4" {
                            div class="mb-3 flex items-start justify-between gap-3" {
                                h4 class="text-xl font-semibold" { (item.title) }
                                span class={ "rounded-full px-3 py-1 text-xs font-semibold " (format::priority_pill_class(&item.priority)) } {
                                    (item.priority)
                                }
                            }
                            p class="text-slate-600" { (item.action) }
                            p class="mt-3 text-sm text-slate-500" {
                                "Duration: " (item.duration) " | Difficulty: " (item.difficulty)
                            }
                        }
                    }
                }
            }
        }
    }

    fn plan(&self) -> Markup {
        html! {
            @if self.view.plan.is_empty() {
                (view::placeholder("No 6-week plan generated."))
            } @else {
                div class="space-y-4" {
                    @for (index, stage) in self.view.plan.iter().enumerate() {
                        article class="rounded-xl border border-slate-200 p-4" {
                            div class="mb-2 flex items-center justify-between gap-3" {
                                div class="inline-flex h-8 w-8 items-center justify-center rounded-full bg-blue-600 text-sm font-bold text-white" {
                                    (index + 1)
                                }
                                span class="rounded-full bg-slate-100 px-3 py-1 text-xs font-semibold text-slate-700" {
                                    (stage.week_range)
                                }
                            }
                            h4 class="text-xl font-semibold" { (stage.goal) }
                            ul class="mt-3 space-y-1 text-slate-600" {
                                @for task in &stage.tasks {
                                    li { "- " (task) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl PageController for ImprovementPage {
    fn page(&self) -> Page {
        Page::Improvement
    }

    async fn load(&mut self, api: &ApiClient, session: &Session) {
        self.error = None;
        match api.improvement(session.prn()).await {
            Ok(payload) => {
                debug!(
                    "Improvement loaded for {} (source: {:?})",
                    session.prn(),
                    payload.source
                );
                self.view = ImprovementView::from_payload(&payload);
                self.loaded = true;
            }
            Err(e) => {
                self.error = Some(failure_message(self.page(), &e, FALLBACK_ERROR));
                self.view.notice = None;
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
                charts: Vec::new(),
                body: self.body(),
            },
        )
    }
}
