//! The save transaction: persist every open file editor, then the
//! structural form, reporting all failures as one aggregated outcome.
//!
//! File saves are issued strictly one at a time and all of them complete
//! before the form goes out: the form handler may validate against
//! just-saved content, so the files are a prerequisite, not a side channel.
//! There is no atomicity beyond that. The form is submitted even when file
//! saves failed, and the caller retries by invoking the whole transaction
//! again.

use studio_client_api::TaskService;

use crate::session::StudioSession;

/// Terminal outcome of one save transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Everything persisted; show a transient notice.
    Success,
    /// One or more steps failed; every collected line, in order.
    Failed(Vec<String>),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Success)
    }
}

/// Run one save transaction against `client`.
///
/// Calling this while a transaction is in flight is a silent no-op
/// returning `None`: nothing is queued, no duplicate requests are issued,
/// and the in-flight transaction is unaffected. The session returns to
/// idle unconditionally, even on failure, so the author may retry.
pub async fn submit<C: TaskService>(session: &mut StudioSession, client: &C) -> Option<SaveOutcome> {
    if session.is_saving() {
        tracing::debug!("submit ignored: a save transaction is already in flight");
        return None;
    }
    session.set_saving(true);

    let mut errors = Vec::new();

    // Only file tabs participate here; inline block editors travel inside
    // the structural form below. Loading and failed tabs carry no editor
    // and are skipped.
    let open_paths: Vec<String> = session
        .tabs()
        .iter()
        .filter(|tab| session.registry().contains(tab.path()))
        .map(|tab| tab.path().to_string())
        .collect();

    for path in open_paths {
        let Some(content) = session.registry().content(&path) else {
            continue;
        };
        match client.save_file(&path, &content).await {
            Ok(()) => session.registry_mut().mark_clean(&path),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "file save failed");
                errors.push(format!("An error occurred while saving the file {path}"));
            }
        }
    }

    let form = session.task_form();
    match client.submit_task(&form).await {
        Ok(response) if response.is_ok() => {}
        Ok(response) => match response.message {
            Some(message) => errors.push(message),
            None => errors.push("An internal error occurred".to_string()),
        },
        Err(err) => {
            tracing::warn!(error = %err, "task form submission failed");
            errors.push("An internal error occurred".to_string());
        }
    }

    session.set_saving(false);

    if errors.is_empty() {
        tracing::info!("task saved");
        Some(SaveOutcome::Success)
    } else {
        tracing::warn!(count = errors.len(), "task save finished with errors");
        Some(SaveOutcome::Failed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditorFactory;
    use crate::session::TabOpened;
    use studio_api_contract::{BlockKind, TaskSaveResponse};
    use studio_rest_client_mock::{MockService, RecordedRequest};

    fn session() -> StudioSession {
        StudioSession::new("task1", Box::new(BufferEditorFactory))
    }

    fn open_ready_tab(session: &mut StudioSession, path: &str, content: &str) {
        let TabOpened::Opened { tab_id } = session.open_tab(path) else {
            panic!("tab for {path} already open");
        };
        session.file_loaded(tab_id, Ok(content.to_string()));
    }

    #[tokio::test]
    async fn test_no_tabs_and_ok_form_is_a_clean_success() {
        let mut session = session();
        session.create_block("q1", BlockKind::Code, None).unwrap();
        let client = MockService::new();

        let outcome = submit(&mut session, &client).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Success);
        assert!(!session.is_saving());
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(matches!(requests[0], RecordedRequest::SubmitTask { .. }));
    }

    #[tokio::test]
    async fn test_files_are_saved_in_tab_order_before_the_form() {
        let mut session = session();
        let client = MockService::new();
        open_ready_tab(&mut session, "a.sh", "a");
        open_ready_tab(&mut session, "b.sh", "b");

        submit(&mut session, &client).await.unwrap();

        let kinds: Vec<_> = client
            .requests()
            .into_iter()
            .map(|r| match r {
                RecordedRequest::SaveFile { path, .. } => format!("save:{path}"),
                RecordedRequest::SubmitTask { .. } => "submit".to_string(),
                other => panic!("unexpected request {other:?}"),
            })
            .collect();
        assert_eq!(kinds, ["save:a.sh", "save:b.sh", "submit"]);
    }

    #[tokio::test]
    async fn test_one_failing_save_out_of_three_yields_one_error_line() {
        let mut session = session();
        let client = MockService::new().with_failing_save("b.sh", "disk full");
        open_ready_tab(&mut session, "a.sh", "a");
        open_ready_tab(&mut session, "b.sh", "b");
        open_ready_tab(&mut session, "c.sh", "c");
        session.registry_mut().set_content("b.sh", "b2");

        let outcome = submit(&mut session, &client).await.unwrap();

        let SaveOutcome::Failed(errors) = outcome else {
            panic!("expected a failed outcome");
        };
        assert_eq!(errors, ["An error occurred while saving the file b.sh"]);

        // All three saves and the submit still went out
        assert_eq!(client.request_count(), 4);
        assert!(matches!(
            client.requests().last().unwrap(),
            RecordedRequest::SubmitTask { .. }
        ));

        // The surviving saves are clean, the failed one keeps its changes
        assert!(session.registry().is_clean("a.sh"));
        assert!(session.registry().is_clean("c.sh"));
        assert!(!session.registry().is_clean("b.sh"));
    }

    #[tokio::test]
    async fn test_successful_save_marks_editors_clean() {
        let mut session = session();
        let client = MockService::new();
        open_ready_tab(&mut session, "a.sh", "original");
        session.registry_mut().set_content("a.sh", "edited");
        assert!(!session.registry().is_clean("a.sh"));

        submit(&mut session, &client).await.unwrap();

        assert!(session.registry().is_clean("a.sh"));
        assert_eq!(client.saved_content("a.sh").unwrap(), "edited");
    }

    #[tokio::test]
    async fn test_server_message_is_reported_verbatim() {
        let mut session = session();
        let client =
            MockService::new().with_submit_response(TaskSaveResponse::failed("Invalid task grader"));

        let outcome = submit(&mut session, &client).await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Failed(vec!["Invalid task grader".to_string()])
        );
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_a_generic_line() {
        let mut session = session();
        let client = MockService::new().with_submit_transport_error("connection reset");

        let outcome = submit(&mut session, &client).await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Failed(vec!["An internal error occurred".to_string()])
        );
        // Idle again, so the author can retry
        assert!(!session.is_saving());
    }

    #[tokio::test]
    async fn test_reentrant_submit_is_a_silent_no_op() {
        let mut session = session();
        let client = MockService::new();
        session.set_saving(true);

        assert!(submit(&mut session, &client).await.is_none());
        assert_eq!(client.request_count(), 0);
        // The guard belongs to the transaction already in flight
        assert!(session.is_saving());
    }

    #[tokio::test]
    async fn test_loading_and_failed_tabs_are_skipped() {
        let mut session = session();
        let client = MockService::new();

        // Still loading: no editor yet
        session.open_tab("pending.txt");
        // Failed: no editor either
        let TabOpened::Opened { tab_id } = session.open_tab("broken.txt") else {
            panic!("expected a new tab");
        };
        session.file_loaded(
            tab_id,
            Err(studio_client_api::ServiceError::Server("nope".to_string())),
        );

        let outcome = submit(&mut session, &client).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Success);
        assert_eq!(client.request_count(), 1);
    }
}
