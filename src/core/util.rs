//! Filepath: src/core/util.rs
//! Small helpers shared across the pipeline: token approximation,
//! path normalization, and cooperative cancellation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Approximate a token count from a rune (char) count. This is
/// deliberately not a real tokenizer: ceil(runeCount / 4).
#[must_use]
pub fn approx_tokens(s: &str) -> usize {
    (s.chars().count() + 3) / 4
}

/// Render a path using forward slashes regardless of platform,
/// for stable artifact headers across Windows/Unix.
#[must_use]
pub fn to_slash_path(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

/// A cheap, clonable cooperative-cancellation flag. Cloning shares
/// the same underlying flag; call `cancel()` from any clone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_tokens_rounds_up() {
        assert_eq!(approx_tokens(""), 0);
        assert_eq!(approx_tokens("abc"), 1);
        assert_eq!(approx_tokens("abcd"), 1);
        assert_eq!(approx_tokens("abcde"), 2);
    }

    #[test]
    fn cancellation_token_shares_state_across_clones() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!handle.is_cancelled());
        token.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn slash_path_normalizes_backslashes() {
        let p = Path::new("a\\b\\c.rs");
        assert_eq!(to_slash_path(p), "a/b/c.rs");
    }
}
