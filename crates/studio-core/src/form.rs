//! Structural form assembly.
//!
//! Plain field values live on the blocks; editor-backed values are read
//! live from the registry at serialization time, so the form always
//! reflects what the author currently sees. Order is derived from the
//! block positions here and nowhere else.

use studio_api_contract::{BlockKind, ChoiceData, ProblemData, ProblemForm, TaskFormData};

use crate::blocks::{choice_key, field_key, BlockManager};
use crate::registry::EditorRegistry;

/// Serialize the current session state into the structural form.
pub fn serialize_task_form(
    task_id: &str,
    blocks: &BlockManager,
    registry: &EditorRegistry,
) -> TaskFormData {
    let problems = blocks
        .iter()
        .enumerate()
        .map(|(order, block)| {
            let pid = block.pid();
            let fields = block.fields();
            let mut data = ProblemData::new(block.kind());

            data.name = Some(fields.name.clone());
            data.header = registry.content(&field_key(pid, "header"));

            match block.kind() {
                BlockKind::Code | BlockKind::CodeSingleLine => {
                    data.language = Some(fields.language.clone());
                    data.optional = fields.optional;
                }
                BlockKind::CodeFile => {
                    data.max_size = fields.max_size;
                    data.allowed_exts = fields
                        .allowed_exts
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                BlockKind::Custom => {
                    data.custom = registry.content(&field_key(pid, "custom"));
                }
                BlockKind::Match => {
                    data.answer = Some(fields.answer.clone());
                }
                BlockKind::MultipleChoice => {
                    data.limit = Some(fields.limit);
                    data.multiple = fields.multiple;
                    data.centralize = fields.centralize;
                    data.success_message = registry.content(&field_key(pid, "success_message"));
                    data.error_message = registry.content(&field_key(pid, "error_message"));
                    data.choices = block
                        .choices()
                        .map(|choice| ChoiceData {
                            text: registry.content(&choice_key(pid, choice.index(), "text")),
                            feedback: registry.content(&choice_key(pid, choice.index(), "feedback")),
                            valid: choice.valid(),
                        })
                        .collect();
                }
            }

            ProblemForm {
                id: pid.to_string(),
                order,
                data,
            }
        })
        .collect();

    TaskFormData {
        task_id: task_id.to_string(),
        problems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditorFactory;
    use studio_api_contract::ChoiceData;

    #[test]
    fn test_order_is_positional_and_contiguous() {
        let mut blocks = BlockManager::new();
        let mut registry = EditorRegistry::new(Box::new(BufferEditorFactory));
        for pid in ["a", "b", "c"] {
            blocks.create(pid, BlockKind::Code, None, &mut registry).unwrap();
        }
        blocks.move_up("c");

        let form = serialize_task_form("task1", &blocks, &registry);
        let ids: Vec<_> = form.problems.iter().map(|p| p.id.as_str()).collect();
        let orders: Vec<_> = form.problems.iter().map(|p| p.order).collect();

        assert_eq!(ids, ["a", "c", "b"]);
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn test_editor_backed_values_are_read_live() {
        let mut blocks = BlockManager::new();
        let mut registry = EditorRegistry::new(Box::new(BufferEditorFactory));

        let mut data = ProblemData::new(BlockKind::MultipleChoice);
        data.choices = vec![ChoiceData {
            text: Some("original".to_string()),
            feedback: None,
            valid: true,
        }];
        blocks.create("mc", BlockKind::MultipleChoice, Some(&data), &mut registry).unwrap();

        registry.set_content(&choice_key("mc", 0, "text"), "edited after load");
        registry.set_content(&field_key("mc", "header"), "new header");

        let form = serialize_task_form("task1", &blocks, &registry);
        let problem = &form.problems[0].data;
        assert_eq!(problem.header.as_deref(), Some("new header"));
        assert_eq!(problem.choices[0].text.as_deref(), Some("edited after load"));
        assert!(problem.choices[0].valid);
    }

    #[test]
    fn test_allowed_extensions_split_back_into_a_list() {
        let mut blocks = BlockManager::new();
        let mut registry = EditorRegistry::new(Box::new(BufferEditorFactory));
        blocks.create("up", BlockKind::CodeFile, None, &mut registry).unwrap();
        blocks.get_mut("up").unwrap().fields_mut().allowed_exts = ".c, .h,".to_string();

        let form = serialize_task_form("task1", &blocks, &registry);
        assert_eq!(form.problems[0].data.allowed_exts, vec![".c", ".h"]);
    }
}
