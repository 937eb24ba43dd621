//! Navigation contract used by the route guard.
//!
//! A [`Navigator`] reports the current path, moves to a new one, and
//! publishes path changes so watchers can react to them.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
    fn subscribe(&self) -> watch::Receiver<String>;
}

/// Number of visited paths [`HistoryNavigator`] keeps.
pub const HISTORY_LIMIT: usize = 100;

/// In-memory navigator that records the most recent [`HISTORY_LIMIT`]
/// visited paths.
#[derive(Debug)]
pub struct HistoryNavigator {
    current: watch::Sender<String>,
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        let start = start.into();
        let (current, _) = watch::channel(start.clone());
        Self {
            current,
            history: Mutex::new(vec![start]),
        }
    }

    /// Recently visited paths, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.current.borrow().clone()
    }

    fn navigate(&self, path: &str) {
        debug!("Navigating to {}", path);
        {
            let mut history = self.history.lock();
            if history.len() == HISTORY_LIMIT {
                history.remove(0);
            }
            history.push(path.to_string());
        }
        self.current.send_replace(path.to_string());
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }
}
