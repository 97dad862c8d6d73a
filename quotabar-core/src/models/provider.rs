//! Provider identity types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Provider Id
// ============================================================================

/// Identifier of a supported provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Anthropic Claude Code.
    Claude,
    /// OpenAI Codex.
    Codex,
    /// Google Gemini CLI.
    Gemini,
    /// Google Antigravity.
    Antigravity,
    /// Z.ai coding plan.
    Zai,
    /// GitHub Copilot (via `gh`).
    Copilot,
}

impl ProviderId {
    /// All known providers, in display order.
    pub const ALL: [ProviderId; 6] = [
        Self::Claude,
        Self::Codex,
        Self::Gemini,
        Self::Antigravity,
        Self::Zai,
        Self::Copilot,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
            Self::Antigravity => "antigravity",
            Self::Zai => "zai",
            Self::Copilot => "copilot",
        }
    }

    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Codex => "Codex",
            Self::Gemini => "Gemini",
            Self::Antigravity => "Antigravity",
            Self::Zai => "Z.ai",
            Self::Copilot => "Copilot",
        }
    }

    /// Name of the CLI binary probed for this provider.
    pub fn cli_binary(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
            Self::Antigravity => "antigravity",
            Self::Zai => "zai",
            Self::Copilot => "gh",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "codex" | "openai" => Ok(Self::Codex),
            "gemini" => Ok(Self::Gemini),
            "antigravity" => Ok(Self::Antigravity),
            "zai" | "z.ai" => Ok(Self::Zai),
            "copilot" | "gh" => Ok(Self::Copilot),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

// ============================================================================
// Account Metadata
// ============================================================================

/// How the account authenticated with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// OAuth browser/device login.
    OAuth,
    /// Static API key.
    ApiKey,
    /// Bundled subscription login (e.g. console account).
    Subscription,
}

/// Subscription tier detected from CLI output headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    /// Free tier.
    Free,
    /// Pro subscription.
    Pro,
    /// Max subscription.
    Max,
    /// Pay-as-you-go API billing.
    ApiBilling,
    /// Enterprise/team plan.
    Enterprise,
    /// Literal tier text that matched no known marker.
    Other(String),
}

impl AccountTier {
    /// Detects a tier from a literal marker in a header line.
    pub fn from_marker(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("api usage billing") || lower.contains("api billing") {
            Some(Self::ApiBilling)
        } else if lower.contains("enterprise") || lower.contains("team") {
            Some(Self::Enterprise)
        } else if lower.contains("max") {
            Some(Self::Max)
        } else if lower.contains("pro") {
            Some(Self::Pro)
        } else if lower.contains("free") {
            Some(Self::Free)
        } else {
            None
        }
    }

    /// Tier assumed when quota data is present but no header identifies the
    /// plan. Quota meters only render for subscription accounts, so the
    /// highest-capability subscription is assumed.
    pub fn assumed() -> Self {
        Self::Max
    }
}

impl fmt::Display for AccountTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "Free"),
            Self::Pro => write!(f, "Pro"),
            Self::Max => write!(f, "Max"),
            Self::ApiBilling => write!(f, "API Billing"),
            Self::Enterprise => write!(f, "Enterprise"),
            Self::Other(t) => write!(f, "{t}"),
        }
    }
}

/// Account metadata attached to a snapshot when the CLI exposes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account email address.
    pub email: Option<String>,
    /// Organization or team name.
    pub organization: Option<String>,
    /// Subscription tier.
    pub tier: Option<AccountTier>,
    /// How the account logged in.
    pub login_method: Option<LoginMethod>,
}

impl AccountInfo {
    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.organization.is_none()
            && self.tier.is_none()
            && self.login_method.is_none()
    }
}
