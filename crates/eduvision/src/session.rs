//! Student session resolution.
//!
//! A session is the normalized PRN plus the API base every request goes to.
//! The PRN comes from an explicit argument, a page URL (`?prn=`) or the
//! value stored by a previous run; when none yields a value the caller is
//! redirected to the landing page instead of loading anything.

use std::fmt;

use tracing::{debug, info, warn};
use url::Url;

use crate::api::ApiBase;
use crate::config::Config;
use crate::error::Result;
use crate::storage::{Storage, API_BASE_KEY, PRN_KEY};

/// Where a missing session sends the user.
pub const REDIRECT_TARGET: &str = "../index.html";

/// Classes of the navigation link for the current page.
pub const NAV_ACTIVE_CLASS: &str = "bg-blue-600 text-white shadow-sm";

/// Classes of the other navigation links.
pub const NAV_INACTIVE_CLASS: &str = "text-slate-800 hover:bg-slate-100";

/// A normalized student identifier: trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prn(String);

impl Prn {
    /// Normalize a raw identifier, returning `None` when nothing is left.
    ///
    /// ```
    /// use eduvision::session::Prn;
    ///
    /// let prn = Prn::parse("  abc123 ").unwrap();
    /// assert_eq!(prn.as_str(), "ABC123");
    /// assert!(Prn::parse("   ").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the transcript export for this student.
    #[must_use]
    pub fn transcript_file_name(&self) -> String {
        format!("{}_transcript.json", self.0)
    }
}

impl fmt::Display for Prn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four student pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Overview metrics, recent grades and the SGPA trend.
    Dashboard,
    /// Per-subject progress, radar and SGPA bars.
    Progress,
    /// Semester reports and transcript export.
    Reports,
    /// Focus areas, recommendations and the six-week plan.
    Improvement,
}

impl Page {
    /// All pages in navigation order.
    pub const ALL: [Self; 4] = [
        Self::Dashboard,
        Self::Progress,
        Self::Reports,
        Self::Improvement,
    ];

    /// Stable key of the page.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Progress => "progress",
            Self::Reports => "reports",
            Self::Improvement => "improvement",
        }
    }

    /// File the page is written to.
    #[must_use]
    pub fn file(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard.html",
            Self::Progress => "progress.html",
            Self::Reports => "reports.html",
            Self::Improvement => "improvement.html",
        }
    }

    /// Navigation label.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Progress => "Progress",
            Self::Reports => "Reports",
            Self::Improvement => "Improvement",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One entry of the page navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Target page.
    pub page: Page,
    /// Relative href carrying the encoded PRN.
    pub href: String,
    /// Style classes.
    pub class: &'static str,
    /// Whether this is the current page.
    pub active: bool,
}

/// An active student session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    prn: Prn,
    api_base: ApiBase,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(prn: Prn, api_base: ApiBase) -> Self {
        Self { prn, api_base }
    }

    /// The student identifier.
    #[must_use]
    pub fn prn(&self) -> &Prn {
        &self.prn
    }

    /// The API base URL.
    #[must_use]
    pub fn api_base(&self) -> &ApiBase {
        &self.api_base
    }

    /// Navigation links for `current`.
    #[must_use]
    pub fn nav_links(&self, current: Page) -> Vec<NavLink> {
        let encoded: String =
            url::form_urlencoded::byte_serialize(self.prn.as_str().as_bytes()).collect();

        Page::ALL
            .iter()
            .map(|&page| {
                let active = page == current;
                NavLink {
                    page,
                    href: format!("{}?prn={}", page.file(), encoded),
                    class: if active {
                        NAV_ACTIVE_CLASS
                    } else {
                        NAV_INACTIVE_CLASS
                    },
                    active,
                }
            })
            .collect()
    }
}

/// Outcome of session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A PRN was found; pages can load.
    Active(Session),
    /// No PRN anywhere; go to the landing page.
    Redirect {
        /// Redirect target.
        to: &'static str,
    },
}

/// Inputs to session resolution, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRequest<'a> {
    /// Identifier given directly.
    pub prn: Option<&'a str>,
    /// Page URL whose `prn` query parameter carries the identifier.
    pub url: Option<&'a str>,
    /// API base given directly.
    pub api_base: Option<&'a str>,
}

/// Read the `prn` query parameter from a page URL.
///
/// Relative URLs such as `dashboard.html?prn=X` are accepted.
#[must_use]
pub fn prn_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).or_else(|_| {
        Url::parse("http://localhost/").and_then(|base| base.join(raw))
    });
    match url {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "prn")
            .map(|(_, value)| value.into_owned()),
        Err(e) => {
            warn!("Ignoring unparseable page URL '{}': {}", raw, e);
            None
        }
    }
}

/// The identifier stored by a previous run.
///
/// # Errors
///
/// Returns an error if the storage lookup fails.
pub fn stored_prn(storage: &Storage) -> Result<Option<Prn>> {
    Ok(storage.get(PRN_KEY)?.as_deref().and_then(Prn::parse))
}

/// Resolve the API base: explicit value, stored override, configuration.
///
/// # Errors
///
/// Returns an error if the chosen value is not a valid base URL or the
/// storage lookup fails.
pub fn resolve_api_base(explicit: Option<&str>, config: &Config, storage: &Storage) -> Result<ApiBase> {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        debug!("Using API base from argument");
        return ApiBase::parse(raw);
    }
    if let Some(stored) = storage.get(API_BASE_KEY)?.filter(|s| !s.trim().is_empty()) {
        debug!("Using stored API base override");
        return ApiBase::parse(&stored);
    }
    ApiBase::parse(&config.api.base_url)
}

/// Resolve the session for a page load.
///
/// Each source is normalized on its own; the first non-empty one wins and
/// is stored for later runs.
///
/// # Errors
///
/// Returns an error if storage fails or the API base is invalid.
pub fn resolve(request: &SessionRequest<'_>, config: &Config, storage: &Storage) -> Result<Resolution> {
    let from_url = request.url.and_then(prn_from_url);

    let prn = match request
        .prn
        .and_then(Prn::parse)
        .or_else(|| from_url.as_deref().and_then(Prn::parse))
    {
        Some(prn) => Some(prn),
        None => stored_prn(storage)?,
    };

    let Some(prn) = prn else {
        info!("No student PRN available, redirecting to {}", REDIRECT_TARGET);
        return Ok(Resolution::Redirect {
            to: REDIRECT_TARGET,
        });
    };

    storage.set(PRN_KEY, prn.as_str())?;
    let api_base = resolve_api_base(request.api_base, config, storage)?;
    debug!("Session for {} against {}", prn, api_base);

    Ok(Resolution::Active(Session::new(prn, api_base)))
}

/// Store an identifier explicitly.
///
/// Returns `None` without touching storage when the identifier is blank.
///
/// # Errors
///
/// Returns an error if the storage write fails.
pub fn login(storage: &Storage, raw: &str) -> Result<Option<Prn>> {
    let Some(prn) = Prn::parse(raw) else {
        return Ok(None);
    };
    storage.set(PRN_KEY, prn.as_str())?;
    info!("Logged in as {}", prn);
    Ok(Some(prn))
}

/// Forget the stored identifier. Returns whether one was stored.
///
/// # Errors
///
/// Returns an error if the storage write fails.
pub fn logout(storage: &Storage) -> Result<bool> {
    storage.remove(PRN_KEY)
}

/// Validate and store an API base override.
///
/// # Errors
///
/// Returns an error for an invalid URL or a failed storage write.
pub fn set_api_base_override(storage: &Storage, raw: &str) -> Result<ApiBase> {
    let base = ApiBase::parse(raw)?;
    storage.set(API_BASE_KEY, base.as_str())?;
    info!("API base override set to {}", base);
    Ok(base)
}

/// Remove the API base override. Returns whether one was stored.
///
/// # Errors
///
/// Returns an error if the storage write fails.
pub fn clear_api_base_override(storage: &Storage) -> Result<bool> {
    storage.remove(API_BASE_KEY)
}
