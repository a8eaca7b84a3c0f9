//! Minting of context tokens for anonymous lock acquisitions.

use rand::Rng;
use serde::Deserialize;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 5;

/// Provider of new, unique context tokens.
pub trait TokenSource: Send + Sync {
    /// Returns a token never handed out before. The logger replaces an empty token
    /// with a random one.
    fn next_token(&self) -> String;
}

impl<F> TokenSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_token(&self) -> String {
        self()
    }
}

/// Default source: the unix timestamp in seconds, a dash, and five random letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn next_token(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
            .collect();
        format!("{}-{}", chrono::Utc::now().timestamp(), suffix)
    }
}

/// Which token a dispatch call acquires the context lock with when it has to wait
/// for another context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPolicy {
    /// A freshly minted token from the logger's [`TokenSource`].
    ///
    /// The escalating call never matches a later caller of the same context, so every
    /// line logged from a non-holding context takes and releases the lock on its own.
    #[default]
    FreshToken,
    /// The caller's own context token, or a fresh one when the caller is anonymous.
    CallerToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_shape() {
        let token = RandomTokenSource.next_token();
        let (seconds, suffix) = token.split_once('-').expect("dash separator");

        assert!(seconds.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_closure_source() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let counter = AtomicUsize::new(0);
        let source = move || format!("t{}", counter.fetch_add(1, Ordering::SeqCst));

        assert_eq!(source.next_token(), "t0");
        assert_eq!(source.next_token(), "t1");
    }

    #[test]
    fn test_default_policy_is_fresh_token() {
        assert_eq!(EscalationPolicy::default(), EscalationPolicy::FreshToken);
    }
}
