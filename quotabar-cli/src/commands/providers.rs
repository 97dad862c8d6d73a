//! `quotabar providers` - list providers and availability.

use anyhow::Result;
use quotabar_providers::{ProbeContext, ProviderRegistry};

use crate::exit_codes;

/// Runs the providers command.
pub async fn run(json: bool) -> Result<i32> {
    let ctx = ProbeContext::new();

    let mut rows = Vec::new();
    for desc in ProviderRegistry::all() {
        let probe = desc.build(&ctx);
        rows.push((desc.id, desc.cli_binary(), probe.is_available()));
    }

    if json {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(id, binary, available)| {
                serde_json::json!({
                    "provider": id.as_str(),
                    "binary": binary,
                    "available": available,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (id, binary, available) in rows {
            let marker = if available { "installed" } else { "not found" };
            println!("{:<12} {:<12} {}", id.display_name(), binary, marker);
        }
    }
    Ok(exit_codes::SUCCESS)
}
