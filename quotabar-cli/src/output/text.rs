//! Human-readable text output.

use quotabar_monitor::ProviderView;
use std::fmt::Write;

/// Renders provider views as aligned text.
pub fn render_views(views: &[ProviderView]) -> String {
    let mut out = String::new();

    for view in views {
        if !view.available {
            let _ = writeln!(out, "{:<12} not installed", view.id.display_name());
            continue;
        }

        match (&view.snapshot, &view.last_error) {
            (Some(snapshot), error) => {
                let _ = writeln!(
                    out,
                    "{:<12} {}{}",
                    view.id.display_name(),
                    snapshot.overall_status(),
                    if snapshot.is_stale() { " (stale)" } else { "" },
                );
                for quota in &snapshot.quotas {
                    let reset = match (&quota.resets_at, &quota.reset_text) {
                        (Some(at), _) => format!("  resets {}", at.format("%Y-%m-%d %H:%M UTC")),
                        (None, Some(text)) => format!("  resets {text}"),
                        (None, None) => String::new(),
                    };
                    let _ = writeln!(
                        out,
                        "  {:<24} {:>5.1}% left{}",
                        quota.kind.to_string(),
                        quota.percent_remaining,
                        reset,
                    );
                }
                if let Some(ref cost) = snapshot.cost {
                    let budget = cost
                        .budget
                        .map(|b| format!(" / ${b}"))
                        .unwrap_or_default();
                    let _ = writeln!(out, "  {:<24} ${}{} spent", "extra usage", cost.spent, budget);
                }
                if let Some(ref account) = snapshot.account {
                    if let Some(ref email) = account.email {
                        let _ = writeln!(out, "  {:<24} {}", "account", email);
                    }
                }
                if let Some(error) = error {
                    let _ = writeln!(out, "  last refresh failed: {error}");
                }
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "{:<12} error: {}", view.id.display_name(), error);
            }
            (None, None) => {
                let _ = writeln!(out, "{:<12} no data yet", view.id.display_name());
            }
        }
    }

    out
}
