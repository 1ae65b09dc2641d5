//! HTML building blocks shared by the student pages.
//!
//! Pages are rendered with `maud`, which escapes interpolated values, so
//! server-provided strings never reach the document as markup. The only raw
//! content is chart scripts, which [`ChartSpec::script`] escapes itself.

use chrono::{DateTime, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::api::types::Student;
use crate::chart::ChartSpec;
use crate::format;
use crate::session::{Page, Session, REDIRECT_TARGET};

/// Name shown when the payload carries none.
pub const DEFAULT_STUDENT_NAME: &str = "Student";

/// Id of the error region element.
pub const ERROR_REGION_ID: &str = "page-error";

const ERROR_CLASS: &str = "rounded-xl border border-rose-200 bg-rose-50 px-4 py-3 text-sm text-rose-700";
const PLACEHOLDER_CLASS: &str = "text-sm text-slate-500";
const SKILL_PILL_CLASS: &str =
    "rounded-full border border-blue-200 bg-blue-50 px-3 py-1 text-sm font-medium text-blue-700";
const TAILWIND_SCRIPT_URL: &str = "https://cdn.tailwindcss.com";

/// Everything a page needs besides its own view model.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// The active session.
    pub session: &'a Session,
    /// Chart library script URL.
    pub chart_script_url: &'a str,
    /// Timestamp printed in the footer.
    pub generated_at: DateTime<Utc>,
}

impl<'a> RenderContext<'a> {
    /// A context stamped with the current time.
    #[must_use]
    pub fn new(session: &'a Session, chart_script_url: &'a str) -> Self {
        Self {
            session,
            chart_script_url,
            generated_at: Utc::now(),
        }
    }
}

/// Student identity shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentHeader {
    /// Display name.
    pub name: String,
    /// Avatar initials.
    pub initials: String,
}

impl Default for StudentHeader {
    fn default() -> Self {
        Self::from_student(None)
    }
}

impl StudentHeader {
    /// Header for a payload's student, falling back to a generic name.
    #[must_use]
    pub fn from_student(student: Option<&Student>) -> Self {
        let name = student
            .and_then(|s| s.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_STUDENT_NAME)
            .to_string();
        let initials = format::initials(&name);
        Self { name, initials }
    }
}

/// A chart placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedChart {
    /// Canvas element id.
    pub canvas_id: &'static str,
    /// What to draw.
    pub spec: ChartSpec,
}

/// Page body plus what the shell needs to frame it.
#[derive(Debug)]
pub struct PageContent<'a> {
    /// Which page this is.
    pub page: Page,
    /// Student header.
    pub header: &'a StudentHeader,
    /// Current error message.
    pub error: Option<&'a str>,
    /// Charts to draw after the body.
    pub charts: Vec<&'a PlacedChart>,
    /// Page body.
    pub body: Markup,
}

/// Render a complete page.
#[must_use]
pub fn layout(ctx: &RenderContext<'_>, content: PageContent<'_>) -> Markup {
    let prn = ctx.session.prn().as_str();
    let title = format!("EduVision | {}", content.page.title());

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                script src=(TAILWIND_SCRIPT_URL) {}
                @if !content.charts.is_empty() {
                    script src=(ctx.chart_script_url) {}
                }
            }
            body class="min-h-screen bg-slate-50 text-slate-900" data-page=(content.page.key()) {
                header class="border-b border-slate-200 bg-white" {
                    div class="mx-auto flex max-w-7xl flex-wrap items-center justify-between gap-4 px-6 py-4" {
                        a href=(REDIRECT_TARGET) class="text-xl font-bold text-blue-600" { "EduVision" }
                        (nav(ctx.session, content.page))
                        (student_badge(content.header, prn))
                    }
                }
                main class="mx-auto max-w-7xl space-y-6 px-6 py-8" {
                    (error_region(content.error))
                    (content.body)
                }
                footer class="mx-auto max-w-7xl px-6 pb-8 text-xs text-slate-400" {
                    "Generated " (ctx.generated_at.format("%Y-%m-%d %H:%M UTC"))
                    " from " (ctx.session.api_base().as_str())
                }
                @for chart in &content.charts {
                    script { (PreEscaped(chart.spec.script(chart.canvas_id))) }
                }
            }
        }
    }
}

fn nav(session: &Session, current: Page) -> Markup {
    html! {
        nav class="flex flex-wrap gap-2" {
            @for link in session.nav_links(current) {
                a href=(link.href)
                    data-nav=(link.page.key())
                    class={ "rounded-lg px-4 py-2 text-sm font-semibold " (link.class) }
                    aria-current=[link.active.then_some("page")] {
                    (link.page.title())
                }
            }
        }
    }
}

fn student_badge(header: &StudentHeader, prn: &str) -> Markup {
    html! {
        div class="flex items-center gap-3" {
            div class="inline-flex h-10 w-10 items-center justify-center rounded-full bg-blue-600 text-sm font-bold text-white" data-student-initials {
                (header.initials)
            }
            div {
                p class="font-semibold" data-student-name { (header.name) }
                p class="text-xs text-slate-500" data-student-prn { (prn) }
            }
            a href=(REDIRECT_TARGET) class="ml-2 text-sm text-slate-500 hover:text-slate-800" id="logoutBtn" { "Logout" }
        }
    }
}

/// The error region, empty when there is no message.
#[must_use]
pub fn error_region(message: Option<&str>) -> Markup {
    html! {
        div id=(ERROR_REGION_ID) {
            @if let Some(message) = message {
                div class={ "flex items-start justify-between gap-3 " (ERROR_CLASS) } role="alert" {
                    span { (message) }
                    button type="button"
                        class="font-semibold text-rose-700"
                        aria-label="Dismiss"
                        onclick="this.parentElement.remove()" { "x" }
                }
            }
        }
    }
}

/// A chart canvas.
#[must_use]
pub fn chart_canvas(canvas_id: &str) -> Markup {
    html! {
        div class="h-72" {
            canvas id=(canvas_id) {}
        }
    }
}

/// A muted "no data" paragraph.
#[must_use]
pub fn placeholder(text: &str) -> Markup {
    html! {
        p class=(PLACEHOLDER_CLASS) { (text) }
    }
}

/// Skill pills, or a placeholder when there are none.
#[must_use]
pub fn skill_pills(skills: &[String], empty: &str) -> Markup {
    html! {
        @if skills.is_empty() {
            (placeholder(empty))
        } @else {
            div class="flex flex-wrap gap-2" {
                @for skill in skills {
                    span class=(SKILL_PILL_CLASS) { (skill) }
                }
            }
        }
    }
}

/// A horizontal bar filled to `score` percent.
#[must_use]
pub fn progress_bar(score: f64) -> Markup {
    html! {
        div class="h-2 overflow-hidden rounded-full bg-slate-200" {
            div class="h-full rounded-full bg-slate-900" style={ "width:" (format::number(score)) "%" } {}
        }
    }
}

/// A labelled metric card.
#[must_use]
pub fn metric_card(label: &str, value: &str, detail: Option<(&str, &str)>) -> Markup {
    html! {
        article class="rounded-2xl border border-slate-200 bg-white p-5" {
            p class="text-sm text-slate-500" { (label) }
            p class="mt-2 text-3xl font-bold" { (value) }
            @if let Some((text, class)) = detail {
                p class=(class) { (text) }
            }
        }
    }
}

/// Section card with a heading.
#[must_use]
pub fn section(title: &str, body: Markup) -> Markup {
    html! {
        section class="rounded-2xl border border-slate-200 bg-white p-5" {
            h2 class="mb-4 text-xl font-semibold" { (title) }
            (body)
        }
    }
}
