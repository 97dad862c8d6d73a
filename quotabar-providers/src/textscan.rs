//! Shared text extraction for provider parsers.
//!
//! The probed CLIs format for humans, not machines, and their output
//! drifts between versions. Extraction is therefore pattern-based: small
//! regexes over rendered text, each tolerant of spacing and styling
//! variation, composed per provider. A new provider parser is written
//! entirely out of these primitives plus its own section logic.

use chrono::{DateTime, Utc};
use quotabar_core::{AccountTier, LoginMethod, ProbeError};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Percentages
// ============================================================================

/// `"72% left"` / `"72 % remaining"`.
static PERCENT_LEFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*%\s*(?:left|remaining)").expect("invalid regex")
});

/// `"28% used"`.
static PERCENT_USED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%\s*used").expect("invalid regex"));

/// Extracts a remaining percentage from a line, normalizing representation:
/// `"X% left"` is used directly, `"X% used"` converts to `100 - X`.
pub fn percent_remaining(text: &str) -> Option<f64> {
    if let Some(caps) = PERCENT_LEFT_RE.captures(text) {
        let left: f64 = caps[1].parse().ok()?;
        return Some(left.clamp(0.0, 100.0));
    }
    if let Some(caps) = PERCENT_USED_RE.captures(text) {
        let used: f64 = caps[1].parse().ok()?;
        return Some((100.0 - used).clamp(0.0, 100.0));
    }
    None
}

// ============================================================================
// Reset times
// ============================================================================

/// `"Resets in 2h 15m"` / `"Reset: Jan 5 at 12am"` -- captures the tail.
static RESET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)resets?:?\s+(.+?)\s*$").expect("invalid regex"));

/// Duration components: `2h`, `15 min`, `30.5s`, `1 day`.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(d|day|days|h|hr|hrs|hour|hours|m|min|mins|minute|minutes|s|sec|secs|second|seconds)\b")
        .expect("invalid regex")
});

/// Extracts the descriptive reset text from a line, e.g.
/// `"Resets Jan 15, 3:30pm (America/Chicago)"` -> `"Jan 15, 3:30pm (America/Chicago)"`.
pub fn reset_text(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        RESET_RE.captures(line.trim()).map(|caps| {
            let captured = caps[1].trim();
            // A trailing ')' with no matching '(' belongs to the enclosing
            // line ("Daily usage (resets midnight UTC)"), not the reset.
            if captured.ends_with(')') && !captured.contains('(') {
                captured.trim_end_matches(')').trim().to_string()
            } else {
                captured.to_string()
            }
        })
    })
}

/// Sums duration components in a description into one interval.
///
/// `"2h 15m"` -> 8100s; fractional seconds are preserved. Returns `None`
/// when no component is present.
pub fn duration_from_text(text: &str) -> Option<Duration> {
    let mut total = 0.0_f64;
    let mut any = false;
    for caps in DURATION_RE.captures_iter(text) {
        let value: f64 = caps[1].parse().ok()?;
        let unit_secs = match &caps[2] {
            u if u.starts_with('d') => 86_400.0,
            u if u.starts_with('h') => 3_600.0,
            u if u.starts_with('m') => 60.0,
            _ => 1.0,
        };
        total += value * unit_secs;
        any = true;
    }
    if any && total.is_finite() && total >= 0.0 {
        Some(Duration::from_secs_f64(total))
    } else {
        None
    }
}

/// Derives an absolute reset instant from a description when possible.
///
/// Relative forms (`"in 2h 15m"`, `"2h 15m"`) resolve against `now`;
/// calendar forms carry an unknown timezone and are left to the caller to
/// retain as text.
pub fn reset_instant(description: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // Calendar dates ("Jan 5", "Feb 1 at 12am") are ambiguous without the
    // account timezone; only pure relative durations are resolved.
    if description.contains(',')
        || MONTH_RE.is_match(description)
        || description.contains("am")
        || description.contains("pm")
    {
        return None;
    }
    let duration = duration_from_text(description)?;
    Some(now + chrono::Duration::from_std(duration).ok()?)
}

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\b")
        .expect("invalid regex")
});

// ============================================================================
// Money
// ============================================================================

/// A money amount, `$` and thousands separators optional.
static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)").expect("invalid regex"));

/// Parses a cost line like `"$5.41 / $20.00 spent"` into `(spent, budget)`.
///
/// The budget is optional (`"$5.41 spent"`). Amounts parse as decimals;
/// thousands separators are tolerated.
pub fn money_pair(text: &str) -> Option<(Decimal, Option<Decimal>)> {
    let (spent_part, budget_part) = match text.split_once('/') {
        Some((a, b)) => (a, Some(b)),
        None => (text, None),
    };

    let spent = first_amount(spent_part)?;
    let budget = budget_part.and_then(first_amount);
    Some((spent, budget))
}

fn first_amount(text: &str) -> Option<Decimal> {
    let caps = MONEY_RE.captures(text)?;
    let cleaned = caps[1].replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

// ============================================================================
// Account metadata
// ============================================================================

/// `"Account: user@example.com"` / `"email: user@example.com"`.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:account|email|signed in as|logged in as)\s*:?\s*([^\s]+@[^\s]+)")
        .expect("invalid regex")
});

/// `"Org: Acme Inc"` / `"Organization: Acme"`.
static ORG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:org(?:anization)?|team)\s*:?\s+(.+?)\s*$").expect("invalid regex")
});

/// `"Login method: OAuth"` / `"logged in with API key"`.
static LOGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:login method|logged in (?:with|via|using))\s*:?\s*(.+?)\s*$")
        .expect("invalid regex")
});

/// Extracts an account email.
pub fn account_email(text: &str) -> Option<String> {
    EMAIL_RE
        .captures(text)
        .map(|caps| caps[1].trim_end_matches(['.', ',']).to_string())
}

/// Extracts an organization name.
pub fn organization(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        ORG_RE
            .captures(line.trim())
            .map(|caps| caps[1].to_string())
    })
}

/// Extracts and classifies the login method.
pub fn login_method(text: &str) -> Option<LoginMethod> {
    let raw = text.lines().find_map(|line| {
        LOGIN_RE
            .captures(line.trim())
            .map(|caps| caps[1].to_lowercase())
    })?;
    if raw.contains("api") {
        Some(LoginMethod::ApiKey)
    } else if raw.contains("subscription") || raw.contains("console") {
        Some(LoginMethod::Subscription)
    } else {
        Some(LoginMethod::OAuth)
    }
}

/// Detects a subscription tier from a header region.
///
/// Only the first few lines are inspected: tier markers live in the
/// screen header, and scanning the whole output would false-positive on
/// model names like "Claude Opus Max-context".
pub fn tier_from_header(text: &str) -> Option<AccountTier> {
    text.lines()
        .take(4)
        .find_map(|line| AccountTier::from_marker(line))
}

// ============================================================================
// Failure banners
// ============================================================================

/// Folder-trust prompts.
const FOLDER_TRUST_MARKERS: &[&str] = &[
    "Do you trust the files in this folder",
    "Do you trust the contents of this folder",
    "trust this folder",
    "trust the files in this workspace",
];

/// Expired or missing login.
const AUTH_MARKERS: &[&str] = &[
    "Please run /login",
    "Not logged in",
    "not currently logged in",
    "authentication expired",
    "OAuth token has expired",
    "Sign in to continue",
    "Invalid API key",
    "Your session has expired",
];

/// Quota surface restricted to subscription billing.
const SUBSCRIPTION_MARKERS: &[&str] = &[
    "only available with a subscription",
    "only available for subscription",
    "requires a subscription plan",
    "not available for API usage billing",
    "not eligible for usage limits",
];

/// CLI too old for the probed surface.
const UPDATE_MARKERS: &[&str] = &[
    "update required",
    "Please update your CLI",
    "no longer supported, please upgrade",
];

/// Detects known failure banners in rendered output.
///
/// Must run before generic parsing so a trust prompt or login banner
/// raises its specific classified error rather than `ParseFailed`.
pub fn detect_failure_banner(text: &str) -> Option<ProbeError> {
    let lower = text.to_lowercase();

    let contains_any = |markers: &[&str]| {
        markers
            .iter()
            .find(|m| lower.contains(&m.to_lowercase()))
            .map(|m| (*m).to_string())
    };

    if contains_any(FOLDER_TRUST_MARKERS).is_some() {
        return Some(ProbeError::FolderTrustRequired);
    }
    if let Some(marker) = contains_any(AUTH_MARKERS) {
        return Some(ProbeError::AuthenticationRequired(marker));
    }
    if let Some(marker) = contains_any(SUBSCRIPTION_MARKERS) {
        return Some(ProbeError::SubscriptionRequired(marker));
    }
    if let Some(marker) = contains_any(UPDATE_MARKERS) {
        return Some(ProbeError::UpdateRequired(marker));
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
