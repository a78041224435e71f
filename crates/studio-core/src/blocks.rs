//! Subproblem blocks and their nested choice collections.
//!
//! Blocks live in a plain vector whose order is the task's subproblem
//! order; no separate order field exists between saves. Each block keeps an
//! explicit set of the editor keys it owns, maintained on every editor
//! creation and destruction, so releasing a deleted block's editors is a
//! direct sweep over that set.

use std::collections::{BTreeMap, BTreeSet};

use studio_api_contract::{validate_problem_id, BlockKind, ChoiceData, LoadedProblem, ProblemData};

use crate::editor::EditorMode;
use crate::error::Error;
use crate::registry::EditorRegistry;
use crate::Result;

/// Registry key of a block-owned field editor.
pub fn field_key(pid: &str, field: &str) -> String {
    format!("field:{pid}:{field}")
}

/// Registry key of one part of a choice row (`text` or `feedback`).
pub fn choice_key(pid: &str, index: usize, part: &str) -> String {
    format!("field:{pid}:choice:{index}:{part}")
}

/// One selectable option of a multiple-choice block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    index: usize,
    valid: bool,
}

impl Choice {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Toggle path used by both the UI control and data-driven
    /// initialization, so loading a record behaves like clicking.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}

/// Form-field values a block carries besides its inline editors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockFields {
    pub name: String,
    pub language: String,
    pub optional: bool,
    pub max_size: Option<u64>,
    /// Comma-joined, mirroring the rendered field.
    pub allowed_exts: String,
    pub answer: String,
    pub limit: u32,
    pub multiple: bool,
    pub centralize: bool,
}

/// One subproblem block.
pub struct Block {
    pid: String,
    kind: BlockKind,
    fields: BlockFields,
    owned_editors: BTreeSet<String>,
    choices: BTreeMap<usize, Choice>,
}

impl Block {
    fn new(pid: &str, kind: BlockKind) -> Self {
        Self {
            pid: pid.to_string(),
            kind,
            fields: BlockFields::default(),
            owned_editors: BTreeSet::new(),
            choices: BTreeMap::new(),
        }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn fields(&self) -> &BlockFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut BlockFields {
        &mut self.fields
    }

    /// Editor keys this block currently owns, choice editors included.
    pub fn owned_editors(&self) -> &BTreeSet<String> {
        &self.owned_editors
    }

    /// Choices in index order.
    pub fn choices(&self) -> impl Iterator<Item = &Choice> {
        self.choices.values()
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(&index)
    }

    pub fn choice_mut(&mut self, index: usize) -> Option<&mut Choice> {
        self.choices.get_mut(&index)
    }

    /// Create a field editor and take ownership of its key.
    fn open_editor(
        &mut self,
        registry: &mut EditorRegistry,
        field: &str,
        mode: EditorMode,
        min_lines: u16,
        initial: &str,
    ) {
        let key = field_key(&self.pid, field);
        registry.open(&key, mode, min_lines, initial);
        self.owned_editors.insert(key);
    }

    fn open_choice_editor(
        &mut self,
        registry: &mut EditorRegistry,
        index: usize,
        part: &str,
        initial: &str,
    ) {
        let key = choice_key(&self.pid, index, part);
        registry.open(&key, EditorMode::Markup, 1, initial);
        self.owned_editors.insert(key);
    }
}

/// Ordered collection of subproblem blocks.
#[derive(Default)]
pub struct BlockManager {
    blocks: Vec<Block>,
}

impl BlockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pid: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.pid == pid)
    }

    pub fn get_mut(&mut self, pid: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.pid == pid)
    }

    pub fn position(&self, pid: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.pid == pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Create a block of `kind` at the end of the list, initializing the
    /// shared fields and dispatching to the kind-specific initializer.
    ///
    /// A malformed or duplicate `pid` is rejected as a validation error
    /// before anything is touched.
    pub fn create(
        &mut self,
        pid: &str,
        kind: BlockKind,
        data: Option<&ProblemData>,
        registry: &mut EditorRegistry,
    ) -> Result<()> {
        validate_problem_id(pid).map_err(|e| Error::validation(e.to_string()))?;
        if self.get(pid).is_some() {
            return Err(Error::validation("This problem id is already used."));
        }

        let mut block = Block::new(pid, kind);

        // Shared across every kind: name field and header editor
        if let Some(name) = data.and_then(|d| d.name.as_deref()) {
            block.fields.name = name.to_string();
        }
        let header = data.and_then(|d| d.header.as_deref()).unwrap_or("");
        block.open_editor(registry, "header", EditorMode::Markup, 10, header);

        match kind {
            BlockKind::Code | BlockKind::CodeSingleLine => {
                if let Some(language) = data.and_then(|d| d.language.as_deref()) {
                    block.fields.language = language.to_string();
                }
                block.fields.optional = data.map(|d| d.optional).unwrap_or(false);
            }
            BlockKind::CodeFile => {
                block.fields.max_size = data.and_then(|d| d.max_size);
                if let Some(data) = data {
                    block.fields.allowed_exts = data.allowed_exts.join(",");
                }
            }
            BlockKind::Custom => {
                let custom = data.and_then(|d| d.custom.as_deref()).unwrap_or("");
                block.open_editor(registry, "custom", EditorMode::Data, 10, custom);
            }
            BlockKind::Match => {
                if let Some(answer) = data.and_then(|d| d.answer.as_deref()) {
                    block.fields.answer = answer.to_string();
                }
            }
            BlockKind::MultipleChoice => {
                block.fields.limit = data.and_then(|d| d.limit).unwrap_or(0);
                block.fields.multiple = data.map(|d| d.multiple).unwrap_or(false);
                block.fields.centralize = data.map(|d| d.centralize).unwrap_or(false);
                let success = data.and_then(|d| d.success_message.as_deref()).unwrap_or("");
                let error = data.and_then(|d| d.error_message.as_deref()).unwrap_or("");
                block.open_editor(registry, "success_message", EditorMode::Markup, 1, success);
                block.open_editor(registry, "error_message", EditorMode::Markup, 1, error);
            }
        }

        self.blocks.push(block);

        if kind == BlockKind::MultipleChoice {
            if let Some(data) = data {
                for choice in &data.choices {
                    self.add_choice(pid, Some(choice), registry)?;
                }
            }
        }

        tracing::debug!(pid, %kind, "created block");
        Ok(())
    }

    /// Build blocks for existing subproblems, in the given order.
    pub fn load(&mut self, problems: &[LoadedProblem], registry: &mut EditorRegistry) -> Result<()> {
        for problem in problems {
            self.create(&problem.id, problem.data.kind, Some(&problem.data), registry)?;
        }
        Ok(())
    }

    /// Swap with the previous sibling; the first position is a no-op.
    pub fn move_up(&mut self, pid: &str) {
        if let Some(pos) = self.position(pid) {
            if pos > 0 {
                self.blocks.swap(pos, pos - 1);
            }
        }
    }

    /// Swap with the next sibling; the last position is a no-op.
    pub fn move_down(&mut self, pid: &str) {
        if let Some(pos) = self.position(pid) {
            if pos + 1 < self.blocks.len() {
                self.blocks.swap(pos, pos + 1);
            }
        }
    }

    /// Remove the block and release every editor it owns, choice editors
    /// included. Returns whether a block was removed.
    pub fn delete(&mut self, pid: &str, registry: &mut EditorRegistry) -> bool {
        let Some(pos) = self.position(pid) else {
            return false;
        };
        let block = self.blocks.remove(pos);
        for key in &block.owned_editors {
            registry.release(key);
        }
        tracing::debug!(pid, editors = block.owned_editors.len(), "deleted block");
        true
    }

    /// Add a choice row to a multiple-choice block. The index is the
    /// smallest non-negative integer not currently in use, so indices freed
    /// by deletion are reused. Returns the allocated index.
    pub fn add_choice(
        &mut self,
        pid: &str,
        data: Option<&ChoiceData>,
        registry: &mut EditorRegistry,
    ) -> Result<usize> {
        let block = self
            .get_mut(pid)
            .ok_or_else(|| Error::session(format!("no such block: {pid}")))?;
        if block.kind != BlockKind::MultipleChoice {
            return Err(Error::session(format!(
                "block {pid} does not take choices"
            )));
        }

        let mut index = 0;
        while block.choices.contains_key(&index) {
            index += 1;
        }

        let text = data.and_then(|d| d.text.as_deref()).unwrap_or("");
        let feedback = data.and_then(|d| d.feedback.as_deref()).unwrap_or("");
        block.open_choice_editor(registry, index, "text", text);
        block.open_choice_editor(registry, index, "feedback", feedback);

        let mut choice = Choice { index, valid: false };
        if data.map(|d| d.valid).unwrap_or(false) {
            choice.set_valid(true);
        }
        block.choices.insert(index, choice);

        Ok(index)
    }

    /// Remove one choice and release its two owned editors. Unknown
    /// indices are a no-op.
    pub fn delete_choice(&mut self, pid: &str, index: usize, registry: &mut EditorRegistry) {
        let Some(block) = self.get_mut(pid) else {
            return;
        };
        if block.choices.remove(&index).is_none() {
            return;
        }
        for part in ["text", "feedback"] {
            let key = choice_key(pid, index, part);
            registry.release(&key);
            block.owned_editors.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditorFactory;

    fn fixtures() -> (BlockManager, EditorRegistry) {
        (
            BlockManager::new(),
            EditorRegistry::new(Box::new(BufferEditorFactory)),
        )
    }

    #[test]
    fn test_create_rejects_bad_and_duplicate_pids() {
        let (mut blocks, mut registry) = fixtures();

        assert!(blocks.create("has space", BlockKind::Code, None, &mut registry).is_err());
        assert!(blocks.is_empty());
        assert!(registry.is_empty());

        blocks.create("q1", BlockKind::Code, None, &mut registry).unwrap();
        let err = blocks.create("q1", BlockKind::Match, None, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "This problem id is already used.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.get("q1").unwrap().kind(), BlockKind::Code);
    }

    #[test]
    fn test_every_block_owns_a_header_editor() {
        let (mut blocks, mut registry) = fixtures();

        let mut data = ProblemData::new(BlockKind::Match);
        data.header = Some("Pick wisely".to_string());
        data.answer = Some("42".to_string());
        blocks.create("q1", BlockKind::Match, Some(&data), &mut registry).unwrap();

        assert_eq!(
            registry.content(&field_key("q1", "header")).unwrap(),
            "Pick wisely"
        );
        assert!(registry.is_clean(&field_key("q1", "header")));
        assert_eq!(blocks.get("q1").unwrap().fields().answer, "42");
    }

    #[test]
    fn test_custom_block_owns_a_data_editor() {
        let (mut blocks, mut registry) = fixtures();

        let mut data = ProblemData::new(BlockKind::Custom);
        data.custom = Some("grader: strict".to_string());
        blocks.create("cfg", BlockKind::Custom, Some(&data), &mut registry).unwrap();

        let key = field_key("cfg", "custom");
        assert_eq!(registry.content(&key).unwrap(), "grader: strict");
        assert_eq!(registry.get(&key).unwrap().mode(), EditorMode::Data);
    }

    #[test]
    fn test_code_file_joins_extensions() {
        let (mut blocks, mut registry) = fixtures();

        let mut data = ProblemData::new(BlockKind::CodeFile);
        data.max_size = Some(1024);
        data.allowed_exts = vec![".c".to_string(), ".h".to_string()];
        blocks.create("up", BlockKind::CodeFile, Some(&data), &mut registry).unwrap();

        let fields = blocks.get("up").unwrap().fields();
        assert_eq!(fields.max_size, Some(1024));
        assert_eq!(fields.allowed_exts, ".c,.h");
    }

    #[test]
    fn test_choice_indices_are_dense_and_reused() {
        let (mut blocks, mut registry) = fixtures();
        blocks.create("mc", BlockKind::MultipleChoice, None, &mut registry).unwrap();

        for expected in 0..4 {
            let index = blocks.add_choice("mc", None, &mut registry).unwrap();
            assert_eq!(index, expected);
        }

        blocks.delete_choice("mc", 1, &mut registry);
        assert_eq!(blocks.add_choice("mc", None, &mut registry).unwrap(), 1);
        assert_eq!(blocks.add_choice("mc", None, &mut registry).unwrap(), 4);
    }

    #[test]
    fn test_delete_choice_releases_both_editors() {
        let (mut blocks, mut registry) = fixtures();
        blocks.create("mc", BlockKind::MultipleChoice, None, &mut registry).unwrap();
        blocks.add_choice("mc", None, &mut registry).unwrap();

        assert!(registry.contains(&choice_key("mc", 0, "text")));
        assert!(registry.contains(&choice_key("mc", 0, "feedback")));

        blocks.delete_choice("mc", 0, &mut registry);
        assert!(!registry.contains(&choice_key("mc", 0, "text")));
        assert!(!registry.contains(&choice_key("mc", 0, "feedback")));
        assert!(!blocks.get("mc").unwrap().owned_editors().iter().any(|k| k.contains("choice")));
    }

    #[test]
    fn test_loaded_choices_keep_their_flags() {
        let (mut blocks, mut registry) = fixtures();

        let mut data = ProblemData::new(BlockKind::MultipleChoice);
        data.choices = vec![
            ChoiceData {
                text: Some("yes".to_string()),
                feedback: Some("right".to_string()),
                valid: true,
            },
            ChoiceData {
                text: Some("no".to_string()),
                feedback: None,
                valid: false,
            },
        ];
        blocks.create("mc", BlockKind::MultipleChoice, Some(&data), &mut registry).unwrap();

        let block = blocks.get("mc").unwrap();
        assert!(block.choice(0).unwrap().valid());
        assert!(!block.choice(1).unwrap().valid());
        assert_eq!(registry.content(&choice_key("mc", 0, "text")).unwrap(), "yes");
        assert_eq!(registry.content(&choice_key("mc", 1, "text")).unwrap(), "no");
    }

    #[test]
    fn test_valid_flag_toggles_through_the_choice() {
        let (mut blocks, mut registry) = fixtures();
        blocks.create("mc", BlockKind::MultipleChoice, None, &mut registry).unwrap();
        blocks.add_choice("mc", None, &mut registry).unwrap();

        let block = blocks.get_mut("mc").unwrap();
        assert!(!block.choice(0).unwrap().valid());

        block.choice_mut(0).unwrap().set_valid(true);
        assert!(block.choice(0).unwrap().valid());
    }

    #[test]
    fn test_move_is_a_no_op_at_the_boundaries() {
        let (mut blocks, mut registry) = fixtures();
        for pid in ["a", "b", "c"] {
            blocks.create(pid, BlockKind::Code, None, &mut registry).unwrap();
        }

        let order = |blocks: &BlockManager| {
            blocks.iter().map(|b| b.pid().to_string()).collect::<Vec<_>>()
        };

        blocks.move_up("a");
        assert_eq!(order(&blocks), ["a", "b", "c"]);
        blocks.move_down("c");
        assert_eq!(order(&blocks), ["a", "b", "c"]);

        blocks.move_down("a");
        assert_eq!(order(&blocks), ["b", "a", "c"]);
        blocks.move_up("c");
        assert_eq!(order(&blocks), ["b", "c", "a"]);
    }

    #[test]
    fn test_delete_block_sweeps_owned_editors() {
        let (mut blocks, mut registry) = fixtures();

        let mut data = ProblemData::new(BlockKind::MultipleChoice);
        data.choices = vec![ChoiceData::default(), ChoiceData::default()];
        blocks.create("mc", BlockKind::MultipleChoice, Some(&data), &mut registry).unwrap();
        blocks.create("other", BlockKind::Custom, None, &mut registry).unwrap();

        // header + success + error + 2 choices x 2, plus the other block's 2
        assert_eq!(registry.len(), 9);

        assert!(blocks.delete("mc", &mut registry));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&field_key("other", "header")));
        assert!(registry.contains(&field_key("other", "custom")));

        assert!(!blocks.delete("mc", &mut registry));
    }
}
