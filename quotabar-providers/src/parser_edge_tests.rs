//! Cross-provider parser edge cases.
//!
//! Every parser consumes rendered terminal output, so the properties that
//! hold across providers are exercised here: ANSI-invariance, the
//! used/left normalization, and banner-before-parse classification.

use pretty_assertions::assert_eq;
use quotabar_core::{ProbeError, QuotaKind, QuotaStatus};
use quotabar_fetch::TerminalRenderer;

use crate::antigravity::parse_quota_table;
use crate::claude::parse_usage_screen;
use crate::codex::parse_status_screen;
use crate::copilot::parse_quota_output;
use crate::gemini::parse_stats_screen;
use crate::zai::parse_usage_blocks;

// ============================================================================
// ANSI invariance
// ============================================================================

#[test]
fn claude_parse_is_ansi_invariant() {
    let plain = "Current session\n72% left\nResets 2pm (America/Chicago)";
    let styled = "\x1b[1mCurrent session\x1b[0m\n\x1b[38;5;114m72% left\x1b[0m\n\x1b[2mResets 2pm (America/Chicago)\x1b[0m";

    let renderer = TerminalRenderer::default();
    let from_plain = parse_usage_screen(&renderer.render_str(plain)).unwrap();
    let from_styled = parse_usage_screen(&renderer.render_str(styled)).unwrap();

    assert_eq!(from_plain.quotas.len(), from_styled.quotas.len());
    let a = from_plain.quota(&QuotaKind::Session).unwrap();
    let b = from_styled.quota(&QuotaKind::Session).unwrap();
    assert_eq!(a.percent_remaining, b.percent_remaining);
    assert_eq!(a.reset_text, b.reset_text);
}

#[test]
fn cursor_redrawn_meter_parses_like_final_frame() {
    // A TUI that draws 10% used, then repositions and redraws 28% used:
    // the parser must see only the final frame.
    let raw = "Current session\n10% used\x1b[1G\x1b[K28% used\nResets in 2h";
    let renderer = TerminalRenderer::default();
    let snapshot = parse_usage_screen(&renderer.render_str(raw)).unwrap();
    assert_eq!(
        snapshot.quota(&QuotaKind::Session).unwrap().percent_remaining,
        72.0
    );
}

// ============================================================================
// Representation normalization
// ============================================================================

#[test]
fn used_and_left_agree_across_parsers() {
    let claude_used = parse_usage_screen("Current session\n25% used").unwrap();
    let claude_left = parse_usage_screen("Current session\n75% left").unwrap();
    assert_eq!(
        claude_used.quota(&QuotaKind::Session).unwrap().percent_remaining,
        claude_left.quota(&QuotaKind::Session).unwrap().percent_remaining,
    );

    let codex_used = parse_status_screen("5h limit: 25% used").unwrap();
    assert_eq!(
        codex_used.quota(&QuotaKind::Session).unwrap().percent_remaining,
        75.0
    );

    let zai = parse_usage_blocks("Monthly limit: 25% used").unwrap();
    assert_eq!(
        zai.quota(&QuotaKind::TimeLimit("monthly".into()))
            .unwrap()
            .percent_remaining,
        75.0
    );
}

// ============================================================================
// Banner classification beats generic parsing
// ============================================================================

#[test]
fn every_parser_classifies_trust_prompt() {
    let banner = "Do you trust the files in this folder?\n 1. Yes, proceed\n 2. No, exit";
    assert_eq!(parse_usage_screen(banner).unwrap_err(), ProbeError::FolderTrustRequired);
    assert_eq!(parse_status_screen(banner).unwrap_err(), ProbeError::FolderTrustRequired);
    assert_eq!(parse_stats_screen(banner).unwrap_err(), ProbeError::FolderTrustRequired);
    assert_eq!(parse_quota_table(banner).unwrap_err(), ProbeError::FolderTrustRequired);
    assert_eq!(parse_usage_blocks(banner).unwrap_err(), ProbeError::FolderTrustRequired);
    assert_eq!(parse_quota_output(banner).unwrap_err(), ProbeError::FolderTrustRequired);
}

#[test]
fn every_parser_classifies_auth_banner() {
    let banner = "Error: Not logged in. Please run /login";
    for result in [
        parse_usage_screen(banner),
        parse_status_screen(banner),
        parse_stats_screen(banner),
        parse_quota_table(banner),
        parse_usage_blocks(banner),
        parse_quota_output(banner),
    ] {
        assert!(matches!(
            result.unwrap_err(),
            ProbeError::AuthenticationRequired(_)
        ));
    }
}

// ============================================================================
// Status boundaries through real parser input
// ============================================================================

#[test]
fn parsed_snapshots_map_to_expected_status() {
    let healthy = parse_usage_screen("Current session\n65% left").unwrap();
    assert_eq!(healthy.overall_status(), QuotaStatus::Healthy);

    let warning = parse_usage_screen("Current session\n35% left").unwrap();
    assert_eq!(warning.overall_status(), QuotaStatus::Warning);

    let critical = parse_usage_screen("Current session\n15% left").unwrap();
    assert_eq!(critical.overall_status(), QuotaStatus::Critical);

    let depleted = parse_usage_screen("Current session\n0% left").unwrap();
    assert_eq!(depleted.overall_status(), QuotaStatus::Depleted);
}
