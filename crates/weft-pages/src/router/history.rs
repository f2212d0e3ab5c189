//! In-memory session history.
//!
//! Mirrors the shape of the browser history API: a list of entries with a
//! cursor, where pushing discards every entry after the cursor. Each entry
//! carries the router's navigation index so back navigation can be detected.

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Location path
	pub path: String,
	/// Router navigation index stored with the entry
	pub index: i64,
}

/// Session history with a cursor.
#[derive(Debug, Clone)]
pub struct History {
	entries: Vec<HistoryEntry>,
	cursor: usize,
}

impl History {
	/// Creates a history holding a single entry for `path` at index 0.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			entries: vec![HistoryEntry {
				path: path.into(),
				index: 0,
			}],
			cursor: 0,
		}
	}

	/// Returns the current entry.
	pub fn current(&self) -> &HistoryEntry {
		// The entry list is never empty
		&self.entries[self.cursor]
	}

	/// Returns the current location path.
	pub fn location(&self) -> &str {
		&self.current().path
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Always `false`; a history has at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the cursor position.
	pub fn position(&self) -> usize {
		self.cursor
	}

	/// Adds an entry after the cursor, dropping any forward entries.
	pub fn push_state(&mut self, index: i64, path: impl Into<String>) {
		self.entries.truncate(self.cursor + 1);
		self.entries.push(HistoryEntry {
			path: path.into(),
			index,
		});
		self.cursor = self.entries.len() - 1;
	}

	/// Overwrites the current entry.
	pub fn replace_state(&mut self, index: i64, path: impl Into<String>) {
		self.entries[self.cursor] = HistoryEntry {
			path: path.into(),
			index,
		};
	}

	/// Moves the cursor back one entry. Returns `false` at the first entry.
	pub fn back(&mut self) -> bool {
		if self.cursor == 0 {
			return false;
		}
		self.cursor -= 1;
		true
	}

	/// Moves the cursor forward one entry. Returns `false` at the last entry.
	pub fn forward(&mut self) -> bool {
		if self.cursor + 1 >= self.entries.len() {
			return false;
		}
		self.cursor += 1;
		true
	}
}
