use parking_lot::RwLock;

use crate::domain::entities::query_params::QueryParams;
use crate::usecase::ports::navigation::Navigator;

/// In-process location history, used by the desktop shell and in tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: RwLock::new(vec![initial.into()]),
        }
    }

    pub fn location(&self) -> String {
        self.history.read().last().cloned().unwrap_or_else(|| "/".to_string())
    }

    /// Appends a new entry, as following a link would.
    pub fn push_location(&self, path_with_query: &str) {
        self.history.write().push(path_with_query.to_string());
    }

    /// Drops the newest entry. Returns false when already at the oldest one.
    pub fn back(&self) -> bool {
        let mut history = self.history.write();
        if history.len() > 1 {
            history.pop();
            true
        } else {
            false
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let location = self.location();
        match location.split_once(|c: char| c == '?' || c == '#') {
            Some((path, _)) => path.to_string(),
            None => location,
        }
    }

    fn current_params(&self) -> QueryParams {
        let location = self.location();
        let without_fragment = location.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((_, query)) => QueryParams::parse(query),
            None => QueryParams::default(),
        }
    }

    fn replace_location(&self, path_with_query: &str) {
        let mut history = self.history.write();
        match history.last_mut() {
            Some(top) => *top = path_with_query.to_string(),
            None => history.push(path_with_query.to_string()),
        }
    }
}
