//! Editor widget boundary and syntax mode selection.
//!
//! The session controller never talks to a concrete editor implementation;
//! it creates widgets through [`EditorFactory`] and drives them through
//! [`EditorWidget`]. [`BufferEditor`] is the stock implementation used by
//! the TUI shell and the tests.

/// Syntax mode handed to the editor widget at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Structured markup (headers, feedback messages, choice texts).
    Markup,
    /// Data-serialization content (the `custom` subproblem field).
    Data,
    Shell,
    Python,
    Php,
    /// Fallback when nothing better is known.
    PlainText,
}

/// Extension table consulted first.
const EXTENSION_MODES: &[(&str, EditorMode)] = &[
    ("rst", EditorMode::Markup),
    ("md", EditorMode::Markup),
    ("yaml", EditorMode::Data),
    ("yml", EditorMode::Data),
    ("json", EditorMode::Data),
    ("toml", EditorMode::Data),
    ("sh", EditorMode::Shell),
    ("bash", EditorMode::Shell),
    ("zsh", EditorMode::Shell),
    ("py", EditorMode::Python),
    ("php", EditorMode::Php),
];

/// Interpreter hints consulted when the extension is unknown and the file
/// starts with `#!`.
const INTERPRETER_MODES: &[(&str, EditorMode)] = &[
    ("bash", EditorMode::Shell),
    ("zsh", EditorMode::Shell),
    ("sh", EditorMode::Shell),
    ("python", EditorMode::Python),
    ("php", EditorMode::Php),
];

/// Pick the syntax mode for a file from its name, falling back to a shebang
/// scan of the first line when the extension is not recognized.
pub fn detect_mode(path: &str, content: &str) -> EditorMode {
    if let Some(ext) = std::path::Path::new(path).extension().and_then(|e| e.to_str()) {
        for (known, mode) in EXTENSION_MODES {
            if ext.eq_ignore_ascii_case(known) {
                return *mode;
            }
        }
    }

    if let Some(rest) = content.strip_prefix("#!") {
        let interpreter = rest.lines().next().unwrap_or("").trim();
        for (hint, mode) in INTERPRETER_MODES {
            if interpreter.contains(hint) {
                return *mode;
            }
        }
    }

    EditorMode::PlainText
}

/// The change-tracking editor instance owned by a registry entry.
pub trait EditorWidget: Send {
    /// Current buffer contents.
    fn content(&self) -> String;

    /// Replace the whole buffer; counts as a modification.
    fn set_content(&mut self, text: &str);

    /// Whether nothing changed since creation or the last [`mark_clean`].
    ///
    /// [`mark_clean`]: EditorWidget::mark_clean
    fn is_clean(&self) -> bool;

    /// Reset the dirty flag after a successful save.
    fn mark_clean(&mut self);
}

/// Creates editor widgets on behalf of the registry.
pub trait EditorFactory: Send {
    /// Instantiate a widget for `key`, pre-filled with `initial` (which
    /// does not count as a modification).
    fn create(&self, key: &str, mode: EditorMode, min_lines: u16, initial: &str)
        -> Box<dyn EditorWidget>;
}

/// Plain text-buffer editor with revision-based dirty tracking.
#[derive(Debug, Default)]
pub struct BufferEditor {
    text: String,
    revision: u64,
    clean_revision: u64,
}

impl BufferEditor {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
            clean_revision: 0,
        }
    }

    /// Append typed input at the end of the buffer.
    pub fn push(&mut self, c: char) {
        self.text.push(c);
        self.revision += 1;
    }

    /// Remove the last character, if any.
    pub fn pop(&mut self) {
        if self.text.pop().is_some() {
            self.revision += 1;
        }
    }
}

impl EditorWidget for BufferEditor {
    fn content(&self) -> String {
        self.text.clone()
    }

    fn set_content(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.revision += 1;
        }
    }

    fn is_clean(&self) -> bool {
        self.revision == self.clean_revision
    }

    fn mark_clean(&mut self) {
        self.clean_revision = self.revision;
    }
}

/// Factory producing [`BufferEditor`] widgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferEditorFactory;

impl EditorFactory for BufferEditorFactory {
    fn create(
        &self,
        _key: &str,
        _mode: EditorMode,
        _min_lines: u16,
        initial: &str,
    ) -> Box<dyn EditorWidget> {
        Box::new(BufferEditor::with_text(initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode_from_extension() {
        assert_eq!(detect_mode("grader.py", ""), EditorMode::Python);
        assert_eq!(detect_mode("header.rst", ""), EditorMode::Markup);
        assert_eq!(detect_mode("task.yaml", ""), EditorMode::Data);
        assert_eq!(detect_mode("RUN.SH", ""), EditorMode::Shell);
    }

    #[test]
    fn test_detect_mode_from_shebang() {
        assert_eq!(detect_mode("run", "#!/bin/bash\necho hi"), EditorMode::Shell);
        assert_eq!(
            detect_mode("grade", "#!/usr/bin/env python\nprint()"),
            EditorMode::Python
        );
    }

    #[test]
    fn test_detect_mode_defaults_to_plain_text() {
        assert_eq!(detect_mode("notes.txt", "no shebang"), EditorMode::PlainText);
        assert_eq!(detect_mode("data.bin", ""), EditorMode::PlainText);
        // Unknown interpreter stays plain
        assert_eq!(detect_mode("run", "#!/usr/bin/ruby"), EditorMode::PlainText);
    }

    #[test]
    fn test_extension_wins_over_shebang() {
        assert_eq!(detect_mode("run.py", "#!/bin/bash"), EditorMode::Python);
    }

    #[test]
    fn test_buffer_editor_dirty_tracking() {
        let mut editor = BufferEditor::with_text("initial");
        assert!(editor.is_clean());

        editor.set_content("changed");
        assert!(!editor.is_clean());
        assert_eq!(editor.content(), "changed");

        editor.mark_clean();
        assert!(editor.is_clean());

        // Re-setting identical content stays clean
        editor.set_content("changed");
        assert!(editor.is_clean());

        editor.push('!');
        assert!(!editor.is_clean());
        editor.pop();
        // popping does not undo the dirty state
        assert!(!editor.is_clean());
    }
}
