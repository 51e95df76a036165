//! Last-request-wins loading

/// Proof that a load was started for a given layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    layout_id: String,
}

impl LoadTicket {
    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }
}

/// Tracks which layout the page currently wants.
///
/// A finished load is applied only if its layout is still the wanted one,
/// whatever order responses arrive in.
#[derive(Debug, Default, Clone)]
pub struct LoadGuard {
    wanted: Option<String>,
}

impl LoadGuard {
    pub fn begin(&mut self, layout_id: &str) -> LoadTicket {
        self.wanted = Some(layout_id.to_string());
        LoadTicket {
            layout_id: layout_id.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.wanted.as_deref() == Some(ticket.layout_id.as_str())
    }

    /// Navigation away: every outstanding ticket becomes stale
    pub fn cancel(&mut self) {
        self.wanted = None;
    }

    pub fn wanted(&self) -> Option<&str> {
        self.wanted.as_deref()
    }

    /// A ticket for the wanted layout, for a fetch started elsewhere than `begin`
    pub fn current(&self) -> Option<LoadTicket> {
        self.wanted.as_ref().map(|id| LoadTicket {
            layout_id: id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_layout_wins() {
        let mut guard = LoadGuard::default();
        let a = guard.begin("A");
        assert!(guard.is_current(&a));
        let b = guard.begin("B");
        assert!(!guard.is_current(&a));
        assert!(guard.is_current(&b));
    }

    #[test]
    fn test_keyed_by_layout_id() {
        let mut guard = LoadGuard::default();
        let first = guard.begin("A");
        guard.begin("B");
        let again = guard.begin("A");
        assert!(guard.is_current(&first));
        assert!(guard.is_current(&again));
    }

    #[test]
    fn test_cancel() {
        let mut guard = LoadGuard::default();
        let a = guard.begin("A");
        guard.cancel();
        assert!(!guard.is_current(&a));
        assert_eq!(guard.wanted(), None);
        assert!(guard.current().is_none());
    }

    #[test]
    fn test_current_ticket_matches_wanted() {
        let mut guard = LoadGuard::default();
        guard.begin("A");
        let ticket = guard.current().unwrap();
        assert_eq!(ticket.layout_id(), "A");
        guard.begin("B");
        assert!(!guard.is_current(&ticket));
    }
}
