//! Editor registry: logical identity to live editor instance.

use std::collections::BTreeMap;

use crate::editor::{EditorFactory, EditorMode, EditorWidget};

/// Registry entry owning one editor widget.
pub struct EditorHandle {
    mode: EditorMode,
    widget: Box<dyn EditorWidget>,
}

impl EditorHandle {
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn widget(&self) -> &dyn EditorWidget {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> &mut dyn EditorWidget {
        self.widget.as_mut()
    }
}

/// Maps a logical identity (file path or synthetic field key) to the live
/// editor bound to it. Widgets are created and destroyed through this
/// registry only, and at most one handle exists per key.
pub struct EditorRegistry {
    factory: Box<dyn EditorFactory>,
    editors: BTreeMap<String, EditorHandle>,
}

impl EditorRegistry {
    pub fn new(factory: Box<dyn EditorFactory>) -> Self {
        Self {
            factory,
            editors: BTreeMap::new(),
        }
    }

    /// Create an editor bound to `key`, or hand back the existing one
    /// untouched (idempotent open).
    pub fn open(
        &mut self,
        key: &str,
        mode: EditorMode,
        min_lines: u16,
        initial: &str,
    ) -> &mut EditorHandle {
        let factory = &self.factory;
        self.editors.entry(key.to_string()).or_insert_with(|| {
            tracing::debug!(key, ?mode, "registering editor");
            EditorHandle {
                mode,
                widget: factory.create(key, mode, min_lines, initial),
            }
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.editors.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&EditorHandle> {
        self.editors.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut EditorHandle> {
        self.editors.get_mut(key)
    }

    /// Unknown keys count as clean: there is nothing to lose.
    pub fn is_clean(&self, key: &str) -> bool {
        self.editors.get(key).map_or(true, |h| h.widget.is_clean())
    }

    pub fn content(&self, key: &str) -> Option<String> {
        self.editors.get(key).map(|h| h.widget.content())
    }

    /// No-op on unknown keys.
    pub fn set_content(&mut self, key: &str, text: &str) {
        if let Some(handle) = self.editors.get_mut(key) {
            handle.widget.set_content(text);
        }
    }

    /// No-op on unknown keys.
    pub fn mark_clean(&mut self, key: &str) {
        if let Some(handle) = self.editors.get_mut(key) {
            handle.widget.mark_clean();
        }
    }

    /// Detach and forget the handle; unknown keys are a no-op.
    pub fn release(&mut self, key: &str) {
        if self.editors.remove(key).is_some() {
            tracing::debug!(key, "released editor");
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.editors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
