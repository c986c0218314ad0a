//! Browser-history seam.

/// The subset of browser history the gate drives.
pub trait History {
    fn current_path(&self) -> String;

    /// Add a new entry (regular navigation).
    fn push(&mut self, path: &str);

    /// Overwrite the current entry (redirects, so back-navigation stays clean).
    fn replace(&mut self, path: &str);
}

/// In-memory history stack for tests and the headless shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Step back one entry; returns false at the start of the stack.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries[self.index].clone()
    }

    fn push(&mut self, path: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, path: &str) {
        self.entries[self.index] = path.to_string();
    }
}
