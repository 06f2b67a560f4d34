//! Navigation capability used when a session cannot be recovered.

use std::sync::Mutex;

/// Sends the application to a route (typically the login screen).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

/// Logs the redirect and does nothing else. Default for headless clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "Session ended, navigation requested");
    }
}

/// Records every requested route, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.routes().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_recording_navigator_keeps_order() {
        let nav = RecordingNavigator::new();
        nav.navigate("/login");
        nav.navigate("/dashboard");
        assert_eq!(nav.routes(), vec!["/login", "/dashboard"]);
        assert_eq!(nav.last().as_deref(), Some("/dashboard"));
    }

    #[test]
    fn test_closure_navigator() {
        let calls = AtomicUsize::new(0);
        let nav = |route: &str| {
            assert_eq!(route, "/login");
            calls.fetch_add(1, Ordering::SeqCst);
        };
        nav.navigate("/login");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
