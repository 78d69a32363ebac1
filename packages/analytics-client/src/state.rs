//! Shared loading/error state for a client instance.

use tokio::sync::watch;

/// Observable fetch status shared by every operation on one client.
///
/// `loading` is derived from a nesting count, so it stays `true` until the
/// outermost in-flight operation has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchState {
    in_flight: usize,
    error: Option<String>,
}

impl FetchState {
    /// Whether any operation is currently in flight.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Message of the most recent failure, cleared when a new operation starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Scoped loading marker.
///
/// Marks the state as loading when created and releases it on drop, which
/// covers success, failure, and a future dropped mid-flight by `try_join!`.
pub(crate) struct LoadingGuard<'a> {
    state: &'a watch::Sender<FetchState>,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn begin(state: &'a watch::Sender<FetchState>) -> Self {
        state.send_modify(|s| {
            s.in_flight += 1;
            s.error = None;
        });
        Self { state }
    }

    pub(crate) fn fail(&self, message: String) {
        record_error(self.state, message);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

pub(crate) fn record_error(state: &watch::Sender<FetchState>, message: String) {
    state.send_modify(|s| s.error = Some(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let (tx, _rx) = watch::channel(FetchState::default());

        {
            let _guard = LoadingGuard::begin(&tx);
            assert!(tx.borrow().loading());
        }

        assert!(!tx.borrow().loading());
    }

    #[test]
    fn test_nested_guards_track_outermost() {
        let (tx, _rx) = watch::channel(FetchState::default());

        let outer = LoadingGuard::begin(&tx);
        let inner = LoadingGuard::begin(&tx);
        drop(inner);
        assert!(tx.borrow().loading());

        drop(outer);
        assert!(!tx.borrow().loading());
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let (tx, _rx) = watch::channel(FetchState::default());
        record_error(&tx, "boom".to_string());
        assert_eq!(tx.borrow().error(), Some("boom"));

        let guard = LoadingGuard::begin(&tx);
        assert_eq!(tx.borrow().error(), None);

        guard.fail("second".to_string());
        drop(guard);
        assert_eq!(tx.borrow().error(), Some("second"));
    }
}
