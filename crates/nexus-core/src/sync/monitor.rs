//! Connectivity tracking
//!
//! The engine does not probe the network itself; the host application feeds
//! platform connectivity signals in, and [`ConnectivityState`] turns them
//! into edge transitions the manager acts on.

use std::sync::atomic::{AtomicBool, Ordering};

/// Edge detected by a connectivity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
    Unchanged,
}

/// Shared online/offline flag with transition detection.
#[derive(Debug)]
pub struct ConnectivityState {
    online: AtomicBool,
}

impl ConnectivityState {
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a connectivity signal, reporting the edge it produced.
    pub fn transition(&self, online: bool) -> Transition {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        match (was_online, online) {
            (false, true) => Transition::WentOnline,
            (true, false) => Transition::WentOffline,
            _ => Transition::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_edges() {
        let state = ConnectivityState::new(false);
        assert!(!state.is_online());

        assert_eq!(state.transition(true), Transition::WentOnline);
        assert!(state.is_online());

        assert_eq!(state.transition(true), Transition::Unchanged);
        assert_eq!(state.transition(false), Transition::WentOffline);
        assert_eq!(state.transition(false), Transition::Unchanged);
    }
}
