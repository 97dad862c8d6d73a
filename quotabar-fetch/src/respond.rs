//! Scripted responses to interactive prompts.
//!
//! Several CLIs stop and wait on interactive prompts (folder trust, theme
//! selection, telemetry opt-in) when they detect a TTY. The response engine
//! watches the output stream for trigger substrings and produces the
//! keystrokes to write back, which lets the PTY runner drive those prompts
//! headlessly.
//!
//! The engine operates on bytes alone and knows nothing about processes, so
//! rule behavior is unit-tested against synthetic streams.

// ============================================================================
// Auto Response
// ============================================================================

/// One trigger/response rule.
#[derive(Debug, Clone)]
pub struct AutoResponse {
    /// Substring that arms the rule when it appears in the output.
    pub trigger: String,
    /// Bytes written back to the terminal when the trigger matches.
    pub response: String,
    /// Whether the rule fires at most once.
    pub once: bool,
}

impl AutoResponse {
    /// Rule that fires a single time.
    pub fn once(trigger: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            response: response.into(),
            once: true,
        }
    }

    /// Rule that fires again each time the trigger reappears in new output.
    pub fn repeating(trigger: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            response: response.into(),
            once: false,
        }
    }
}

// ============================================================================
// Response Engine
// ============================================================================

/// Scans an output stream against an ordered rule list.
///
/// Incoming chunks are ANSI-stripped before matching, so a trigger matches
/// regardless of how the CLI styles its prompt. Rules are checked in order
/// on every chunk; a repeating rule only rearms on output that arrived
/// after its previous match, so one prompt never triggers twice.
#[derive(Debug)]
pub struct ResponseEngine {
    rules: Vec<AutoResponse>,
    /// Per rule: offset into `seen` where the next scan starts.
    scan_from: Vec<usize>,
    /// Per rule: whether a once-rule has already fired.
    fired: Vec<bool>,
    /// Accumulated ANSI-stripped output.
    seen: String,
}

impl ResponseEngine {
    /// Creates an engine over the given rules.
    pub fn new(rules: Vec<AutoResponse>) -> Self {
        let n = rules.len();
        Self {
            rules,
            scan_from: vec![0; n],
            fired: vec![false; n],
            seen: String::new(),
        }
    }

    /// Returns true if no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Feeds a chunk of raw output and returns the responses to write, in
    /// rule order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let stripped = strip_ansi_escapes::strip(chunk);
        self.seen.push_str(&String::from_utf8_lossy(&stripped));

        let mut responses = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.once && self.fired[i] {
                continue;
            }
            let window = &self.seen[self.scan_from[i]..];
            if let Some(pos) = window.find(&rule.trigger) {
                self.fired[i] = true;
                self.scan_from[i] += pos + rule.trigger.len();
                responses.push(rule.response.clone());
            }
        }
        responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_trigger() {
        let mut engine = ResponseEngine::new(vec![AutoResponse::once(
            "Do you trust the files in this folder?",
            "1\n",
        )]);

        assert!(engine.feed(b"starting up...").is_empty());
        let responses = engine.feed(b"Do you trust the files in this folder?");
        assert_eq!(responses, vec!["1\n".to_string()]);
    }

    #[test]
    fn trigger_split_across_chunks() {
        let mut engine = ResponseEngine::new(vec![AutoResponse::once("trust the files", "y\n")]);
        assert!(engine.feed(b"Do you trust th").is_empty());
        let responses = engine.feed(b"e files in this folder?");
        assert_eq!(responses, vec!["y\n".to_string()]);
    }

    #[test]
    fn once_rule_fires_once() {
        let mut engine = ResponseEngine::new(vec![AutoResponse::once("Press Enter", "\n")]);
        assert_eq!(engine.feed(b"Press Enter to continue").len(), 1);
        assert!(engine.feed(b"Press Enter to continue").is_empty());
    }

    #[test]
    fn repeating_rule_rearms_on_new_occurrence() {
        let mut engine = ResponseEngine::new(vec![AutoResponse::repeating("more?", " \n")]);
        assert_eq!(engine.feed(b"-- more? --").len(), 1);
        // No new occurrence: nothing fires.
        assert!(engine.feed(b"page two").is_empty());
        // A fresh occurrence fires again.
        assert_eq!(engine.feed(b"-- more? --").len(), 1);
    }

    #[test]
    fn matches_through_ansi_styling() {
        let mut engine = ResponseEngine::new(vec![AutoResponse::once("trust this folder", "1\n")]);
        let styled = b"\x1b[1m\x1b[33mDo you \x1b[0mtrust this folder\x1b[0m?";
        assert_eq!(engine.feed(styled), vec!["1\n".to_string()]);
    }

    #[test]
    fn rules_fire_in_order_on_one_chunk() {
        let mut engine = ResponseEngine::new(vec![
            AutoResponse::once("choose a theme", "1\n"),
            AutoResponse::once("trust this folder", "y\n"),
        ]);
        let responses = engine.feed(b"trust this folder? choose a theme:");
        assert_eq!(responses, vec!["1\n".to_string(), "y\n".to_string()]);
    }
}
