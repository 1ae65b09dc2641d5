//! Page controllers.
//!
//! Each controller owns the view model of one student page. `load` performs
//! a single API call and either replaces the view model or records the
//! failure in the page's error region; the previous view model survives a
//! failed load. `render` turns the current state into a full HTML page.

pub mod dashboard;
pub mod improvement;
pub mod progress;
pub mod reports;

use maud::Markup;
use tracing::warn;

use crate::api::ApiClient;
use crate::error::Error;
use crate::session::{Page, Session};
use crate::view::RenderContext;

pub use dashboard::DashboardPage;
pub use improvement::ImprovementPage;
pub use progress::ProgressPage;
pub use reports::ReportsPage;

/// Controller of one student page.
#[async_trait::async_trait]
pub trait PageController: Send + std::fmt::Debug {
    /// The page this controller renders.
    fn page(&self) -> Page;

    /// Fetch the page data for the session's student.
    ///
    /// Failures never escape: they land in the error region.
    async fn load(&mut self, api: &ApiClient, session: &Session);

    /// Message currently shown in the error region.
    fn error(&self) -> Option<&str>;

    /// Whether at least one load has succeeded.
    fn is_loaded(&self) -> bool;

    /// Render the full page.
    fn render(&self, ctx: &RenderContext<'_>) -> Markup;
}

/// Message shown for a failed load, with the page fallback for blank errors.
pub(crate) fn failure_message(page: Page, error: &Error, fallback: &str) -> String {
    let message = error.to_string();
    match error.status() {
        Some(status) => warn!("Failed to load {} page (HTTP {}): {}", page, status, message),
        None => warn!("Failed to load {} page: {}", page, message),
    }
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// A controller for one page.
#[must_use]
pub fn controller_for(page: Page) -> Box<dyn PageController> {
    match page {
        Page::Dashboard => Box::new(DashboardPage::new()),
        Page::Progress => Box::new(ProgressPage::new()),
        Page::Reports => Box::new(ReportsPage::new()),
        Page::Improvement => Box::new(ImprovementPage::new()),
    }
}
