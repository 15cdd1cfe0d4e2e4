//! Best-effort dismissal of cookie and consent overlays.
//!
//! Nothing here can fail a scrape. Every attempt is bounded and recorded in
//! a [`ConsentOutcome`] so callers and tests can see what happened.

use crate::browser::PageSession;
use crate::settings::ScrapeTimeouts;

/// Button texts tried in order, matched case-insensitively as substrings.
pub const BUTTON_TEXTS: [&str; 7] = [
    "accept all",
    "allow all",
    "accept",
    "agree",
    "got it",
    "ok",
    "continue",
];

/// Selectors of common consent frameworks, tried after the button texts.
pub const OVERLAY_SELECTORS: [&str; 4] = [
    "#onetrust-accept-btn-handler",
    "[id*=\"cookie-accept\"]",
    "[id*=\"consent-accept\"]",
    ".cookie-notify-closeBtn",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentOutcome {
    /// Patterns tried, successful or not.
    pub attempts: usize,
    /// Patterns that produced a click, in the order they were tried.
    pub dismissed_by: Vec<String>,
}

impl ConsentOutcome {
    #[must_use]
    pub fn dismissed(&self) -> bool {
        !self.dismissed_by.is_empty()
    }
}

/// Tries every known consent pattern against the current page.
///
/// Banners are sometimes layered (a cookie banner over a region picker), so
/// a successful click does not stop the remaining patterns.
pub async fn dismiss_consent(
    session: &dyn PageSession,
    timeouts: &ScrapeTimeouts,
) -> ConsentOutcome {
    let mut outcome = ConsentOutcome::default();

    for text in BUTTON_TEXTS {
        outcome.attempts += 1;
        let attempt = session.click_button_with_text(text);
        match tokio::time::timeout(timeouts.consent_attempt, attempt).await {
            Ok(Ok(true)) => outcome.dismissed_by.push(text.to_string()),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::debug!(pattern = text, error = %e, "consent click failed"),
            Err(_) => tracing::debug!(pattern = text, "consent click timed out"),
        }
    }

    for selector in OVERLAY_SELECTORS {
        outcome.attempts += 1;
        let attempt = session.click_selector(selector);
        match tokio::time::timeout(timeouts.consent_attempt, attempt).await {
            Ok(Ok(true)) => outcome.dismissed_by.push(selector.to_string()),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::debug!(selector, error = %e, "consent click failed"),
            Err(_) => tracing::debug!(selector, "consent click timed out"),
        }
    }

    if outcome.dismissed() {
        tracing::debug!(dismissed_by = ?outcome.dismissed_by, "consent overlay dismissed");
    }
    outcome
}
