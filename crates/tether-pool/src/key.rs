//! Composite pool key.

use std::fmt;

/// Identifies one pool slot: a session paired with the provider serving it.
///
/// Both parts are kept separately, so no separator character can make two
/// different pairs collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    /// Session identifier.
    pub session_id: String,

    /// Provider or model variant identifier.
    pub provider: String,
}

impl PoolKey {
    /// Create a key from its parts.
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session_id, self.provider)
    }
}

impl<S: Into<String>, P: Into<String>> From<(S, P)> for PoolKey {
    fn from((session_id, provider): (S, P)) -> Self {
        Self::new(session_id, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parts_do_not_collide() {
        // Joined with ':' both would read "a:b:c".
        let left = PoolKey::new("a:b", "c");
        let right = PoolKey::new("a", "b:c");

        assert_ne!(left, right);
        let set: HashSet<_> = [left, right].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        let key = PoolKey::from(("session-1", "nova-lite"));
        assert_eq!(key.to_string(), "session-1:nova-lite");
    }
}
