//! The workspace — labeled pins that stay visible across iterations.
//!
//! Pins persist until explicitly removed. Insertion order is
//! preserved so the rendered header is stable between iterations.

use serde::{Deserialize, Serialize};

/// A single labeled pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub label: String,
    pub content: String,
}

/// Insertion-ordered pin collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    pins: Vec<Pin>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a pin. Replacing keeps the original position.
    pub fn pin(&mut self, label: impl Into<String>, content: impl Into<String>) {
        let label = label.into();
        let content = content.into();
        match self.pins.iter_mut().find(|p| p.label == label) {
            Some(existing) => existing.content = content,
            None => self.pins.push(Pin { label, content }),
        }
    }

    /// Remove a pin by label. Returns whether anything was removed.
    pub fn unpin(&mut self, label: &str) -> bool {
        let before = self.pins.len();
        self.pins.retain(|p| p.label != label);
        self.pins.len() < before
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.pins
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.content.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.pins.iter().any(|p| p.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Total characters pinned, used for the heavy-workspace warning.
    pub fn total_chars(&self) -> usize {
        self.pins.iter().map(|p| p.content.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_keep_insertion_order() {
        let mut ws = Workspace::new();
        ws.pin("b", "2");
        ws.pin("a", "1");
        ws.pin("c", "3");

        let labels: Vec<_> = ws.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["b", "a", "c"]);
    }

    #[test]
    fn repin_replaces_in_place() {
        let mut ws = Workspace::new();
        ws.pin("note", "old");
        ws.pin("other", "x");
        ws.pin("note", "new");

        assert_eq!(ws.get("note"), Some("new"));
        let labels: Vec<_> = ws.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["note", "other"]);
    }

    #[test]
    fn unpin_removes() {
        let mut ws = Workspace::new();
        ws.pin("note", "text");
        assert!(ws.unpin("note"));
        assert!(!ws.unpin("note"));
        assert!(ws.is_empty());
    }

    #[test]
    fn total_chars_sums_content() {
        let mut ws = Workspace::new();
        ws.pin("a", "12345");
        ws.pin("b", "123");
        assert_eq!(ws.total_chars(), 8);
    }
}
