//! `eduvision` - Student analytics dashboard client for the EduVision API
//!
//! This library resolves a student session, fetches the dashboard, progress,
//! reports and improvement data from the EduVision REST API, and renders each
//! page as static HTML.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pages;
pub mod session;
pub mod storage;
pub mod view;

pub use api::{ApiBase, ApiClient};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pages::PageController;
pub use session::{Page, Prn, Resolution, Session};
pub use storage::Storage;
