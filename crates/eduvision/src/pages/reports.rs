//! Reports page: transcript summary, per-semester report cards and the
//! transcript export.

use std::path::{Path, PathBuf};

use maud::{html, Markup};
use serde_json::Value;
use tracing::{debug, info};

use super::{failure_message, PageController};
use crate::api::types::{ReportsPayload, SubjectGrade};
use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::format;
use crate::session::{Page, Prn, Session};
use crate::view::{self, PageContent, RenderContext, StudentHeader};

const FALLBACK_ERROR: &str = "Failed to load reports.";

/// One semester's report card.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterCard {
    /// Semester label.
    pub semester: String,
    /// SGPA display.
    pub sgpa: String,
    /// Subject rows.
    pub subjects: Vec<SubjectGrade>,
}

/// Reports view model.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportsView {
    /// Student header.
    pub header: StudentHeader,
    /// Current SGPA.
    pub current_sgpa: String,
    /// Overall CGPA.
    pub overall_cgpa: String,
    /// 12th-grade percentage.
    pub twelfth: String,
    /// Semesters completed.
    pub semesters_completed: String,
    /// Rank as `rank/size`.
    pub rank: String,
    /// Semester cards.
    pub semesters: Vec<SemesterCard>,
}

impl Default for ReportsView {
    fn default() -> Self {
        Self::from_payload(&ReportsPayload::default())
    }
}

impl ReportsView {
    /// Build the view model from a payload.
    #[must_use]
    pub fn from_payload(payload: &ReportsPayload) -> Self {
        let summary = payload.summary.clone().unwrap_or_default();

        let rank = match (
            summary.class_rank.filter(|r| *r > 0),
            summary.class_size.filter(|s| *s > 0),
        ) {
            (Some(rank), Some(size)) => format!("{rank}/{size}"),
            _ => format::PLACEHOLDER.to_string(),
        };

        let semesters = payload
            .reports
            .iter()
            .map(|r| SemesterCard {
                semester: r.semester.clone(),
                sgpa: format::sgpa(r.sgpa),
                subjects: r.subjects.clone(),
            })
            .collect();

        Self {
            header: StudentHeader::from_student(payload.student.as_ref()),
            current_sgpa: format::sgpa(summary.current_sgpa),
            overall_cgpa: format::sgpa(summary.overall_cgpa),
            twelfth: format::percent(summary.twelfth_percentage),
            semesters_completed: summary
                .semesters_completed
                .map_or_else(|| format::PLACEHOLDER.to_string(), |n| n.to_string()),
            rank,
            semesters,
        }
    }
}

/// Reports controller.
#[derive(Debug, Default)]
pub struct ReportsPage {
    view: ReportsView,
    error: Option<String>,
    /// Last successfully fetched payload, exactly as received.
    raw: Option<(Prn, Value)>,
}

impl ReportsPage {
    /// A controller in its pre-load state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view model.
    #[must_use]
    pub fn view(&self) -> &ReportsView {
        &self.view
    }

    /// Write the last fetched payload as `<PRN>_transcript.json` in `dir`.
    ///
    /// Returns `None` without writing anything when no load has succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn export_transcript(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let Some((prn, raw)) = &self.raw else {
            debug!("No reports loaded, skipping transcript export");
            return Ok(None);
        };

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path = dir.join(prn.transcript_file_name());
        let json = serde_json::to_string_pretty(raw)?;
        std::fs::write(&path, json)?;

        info!("Transcript exported to {}", path.display());
        Ok(Some(path))
    }

    fn body(&self) -> Markup {
        let model = &self.view;
        html! {
            div class="flex flex-wrap items-center justify-between gap-3" {
                h1 class="text-3xl font-bold" { "Academic Reports" }
                span class="text-sm text-slate-500" { "Export with " code { "eduv reports --export" } }
            }
            div class="grid gap-4 md:grid-cols-2 xl:grid-cols-5" {
                (view::metric_card("Current SGPA", &model.current_sgpa, None))
                (view::metric_card("Overall CGPA", &model.overall_cgpa, None))
                (view::metric_card("Class Rank", &model.rank, None))
                (view::metric_card("12th Percentage", &model.twelfth, None))
                (view::metric_card("Semesters Completed", &model.semesters_completed, None))
            }
            div id="reportsList" class="space-y-6" {
                @if model.semesters.is_empty() {
                    div class="rounded-2xl border border-slate-200 bg-white p-5 text-sm text-slate-500" {
                        "No semester reports available."
                    }
                } @else {
                    @for card in &model.semesters {
                        (semester_card(card))
                    }
                }
            }
        }
    }
}

fn semester_card(card: &SemesterCard) -> Markup {
    html! {
        article class="rounded-2xl border border-slate-200 bg-white p-5" {
            div class="mb-4" {
                h3 class="text-2xl font-semibold" { (card.semester) }
                p class="text-slate-500" { "SGPA: " (card.sgpa) }
            }
            div class="grid gap-3 md:grid-cols-2 xl:grid-cols-3" {
                @if card.subjects.is_empty() {
                    (view::placeholder("No subject rows for this semester."))
                }
                @for subject in &card.subjects {
                    div class="rounded-xl border border-slate-200 p-4" {
                        div class="mb-2 flex items-center justify-between gap-3" {
                            p class="font-semibold" { (subject.subject) }
                            span class={ "rounded-full px-3 py-1 text-xs font-semibold " (format::grade_badge_class(&subject.grade)) } {
                                (subject.grade)
                            }
                        }
                        p class="text-sm text-slate-500" { "Score: " (format::number(subject.score)) "%" }
                        div class="mt-2" { (view::progress_bar(subject.score)) }
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl PageController for ReportsPage {
    fn page(&self) -> Page {
        Page::Reports
    }

    async fn load(&mut self, api: &ApiClient, session: &Session) {
        self.error = None;
        match api.reports(session.prn()).await {
            Ok((payload, raw)) => {
                debug!(
                    "Reports loaded for {} ({} semesters)",
                    session.prn(),
                    payload.reports.len()
                );
                self.view = ReportsView::from_payload(&payload);
                self.raw = Some((session.prn().clone(), raw));
            }
            Err(e) => self.error = Some(failure_message(self.page(), &e, FALLBACK_ERROR)),
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_loaded(&self) -> bool {
        self.raw.is_some()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::pages::testing::{client, context, session};

    const PAYLOAD: &str = r#"{
        "student": {"prn": "PRN01", "name": "Riya"},
        "summary": {
            "current_sgpa": 8.1, "overall_cgpa": 7.95, "twelfth_percentage": 90,
            "semesters_completed": 2, "class_rank": 5, "class_size": 60
        },
        "reports": [
            {"semester": "Sem 1", "sgpa": 7.8, "subjects": [{"subject": "Maths", "score": 81, "grade": "A"}]},
            {"semester": "Sem 2", "sgpa": null, "subjects": []}
        ]
    }"#;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eduvision_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_load_and_render() {
        let (api, _) = client(ScriptedTransport::new().respond(200, PAYLOAD));
        let session = session();
        let mut page = ReportsPage::new();
        page.load(&api, &session).await;

        let view = page.view();
        assert_eq!(view.rank, "5/60");
        assert_eq!(view.overall_cgpa, "7.95");
        assert_eq!(view.twelfth, "90.0%");
        assert_eq!(view.semesters_completed, "2");
        assert_eq!(view.semesters[1].sgpa, "-");

        let html = page.render(&context(&session)).into_string();
        assert!(html.contains("SGPA: 7.80"));
        assert!(html.contains("No subject rows for this semester."));
        assert!(html.contains("Score: 81%"));
    }

    #[tokio::test]
    async fn test_missing_summary_and_reports() {
        let (api, _) = client(ScriptedTransport::new().respond(200, r#"{"summary":{"class_rank":3}}"#));
        let session = session();
        let mut page = ReportsPage::new();
        page.load(&api, &session).await;

        let view = page.view();
        assert_eq!(view.rank, "-");
        assert_eq!(view.semesters_completed, "-");
        assert_eq!(view.current_sgpa, "-");

        let html = page.render(&context(&session)).into_string();
        assert!(html.contains("No semester reports available."));
    }

    #[test]
    fn test_export_before_load_is_noop() {
        let dir = temp_dir("export_noop");
        let page = ReportsPage::new();

        assert_eq!(page.export_transcript(&dir).unwrap(), None);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_export_writes_raw_payload() {
        let body = r#"{"student":{"prn":"PRN01"},"reports":[],"generated_by":"server"}"#;
        let (api, _) = client(ScriptedTransport::new().respond(200, body));
        let session = session();
        let mut page = ReportsPage::new();
        page.load(&api, &session).await;

        let dir = temp_dir("export_raw");
        let path = page.export_transcript(&dir).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "PRN01_transcript.json");

        let written = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["generated_by"], "server");
        assert!(written.contains("\n  \"student\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_exportable_payload() {
        let (api, _) = client(
            ScriptedTransport::new()
                .respond(200, PAYLOAD)
                .respond(404, r#"{"error":"Student not found","suggestions":[]}"#),
        );
        let session = session();
        let mut page = ReportsPage::new();
        page.load(&api, &session).await;
        page.load(&api, &session).await;

        assert_eq!(page.error(), Some("Student not found"));
        assert!(page.is_loaded());
        assert_eq!(page.view().rank, "5/60");

        let dir = temp_dir("export_after_failure");
        assert!(page.export_transcript(&dir).unwrap().is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
