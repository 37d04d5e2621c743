//! Recently used actor names, most recent first.

pub const DEFAULT_USER_HISTORY_CAPACITY: usize = 10;

/// Bounded list of names that have recently acted on this device.
///
/// A name already present keeps its position; new names go to the front and
/// the oldest entry falls off once `capacity` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHistory {
    names: Vec<String>,
    capacity: usize,
}

impl UserHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            names: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from a persisted list, dropping blanks and duplicates.
    pub fn from_names(names: impl IntoIterator<Item = String>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for name in names {
            let name = name.trim();
            if name.is_empty() || history.contains(name) || history.names.len() == history.capacity {
                continue;
            }
            history.names.push(name.to_string());
        }
        history
    }

    /// Record a name. Returns `true` if the list changed.
    pub fn record(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.insert(0, name.to_string());
        self.names.truncate(self.capacity);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for UserHistory {
    fn default() -> Self {
        Self::new(DEFAULT_USER_HISTORY_CAPACITY)
    }
}
