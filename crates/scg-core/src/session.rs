//! Per-run context for user-facing notices that should fire once.

use std::collections::HashSet;

/// Tracks which notice keys have already been surfaced during this
/// generation session. Passed explicitly to the operations that may warn,
/// instead of living in module-level state.
#[derive(Debug, Default)]
pub struct Session {
    notified: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Returns true the first time a key is seen.
    pub fn note_once(&mut self, key: &str) -> bool {
        self.notified.insert(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_once() {
        let mut session = Session::new();
        assert!(session.note_once("config:/tmp/a"));
        assert!(!session.note_once("config:/tmp/a"));
        assert!(session.note_once("config:/tmp/b"));
    }
}
