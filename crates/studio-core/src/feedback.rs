//! Feedback retrieval for old submissions.

use studio_api_contract::FeedbackData;
use studio_client_api::TaskService;

use crate::session::StudioSession;

const RETRIEVAL_ERROR: &str = "An error occurred while retrieving the submission";

/// Fetch and format the feedback for one submission.
///
/// Guarded like the save transaction: a second call while one is in flight
/// is a silent no-op returning `None`. Any failure collapses into a single
/// user-facing line; the guard clears unconditionally.
pub async fn load_feedback<C: TaskService>(
    session: &mut StudioSession,
    client: &C,
    submission_id: &str,
) -> Option<String> {
    if session.is_loading_feedback() {
        tracing::debug!("feedback request ignored: one is already in flight");
        return None;
    }
    session.set_loading_feedback(true);

    let report = match client.fetch_feedback(submission_id).await {
        Ok(response) if response.status == "ok" => match response.data {
            Some(data) => format_feedback(&data),
            None => RETRIEVAL_ERROR.to_string(),
        },
        Ok(_) => RETRIEVAL_ERROR.to_string(),
        Err(err) => {
            tracing::warn!(submission_id, error = %err, "feedback fetch failed");
            RETRIEVAL_ERROR.to_string()
        }
    };

    session.set_loading_feedback(false);
    Some(report)
}

/// Render one submission's feedback as a plain-text report.
fn format_feedback(data: &FeedbackData) -> String {
    let mut out = String::new();
    out.push_str("Result\n");
    out.push_str(&format!("{} - {}%\n", data.result, data.grade));
    out.push_str("\nFeedback - top\n");
    out.push_str(&data.text);
    out.push('\n');
    for (index, problem) in data.problems.iter().enumerate() {
        out.push_str(&format!("\nFeedback - subproblem {index}\n"));
        out.push_str(problem);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditorFactory;
    use studio_api_contract::FeedbackResponse;
    use studio_rest_client_mock::MockService;

    #[tokio::test]
    async fn test_feedback_round_trip_and_guard() {
        let mut session = StudioSession::new("task1", Box::new(BufferEditorFactory));
        let client = MockService::new().with_feedback(
            "sub42",
            FeedbackResponse {
                status: "ok".to_string(),
                data: Some(FeedbackData {
                    result: "success".to_string(),
                    grade: 100.0,
                    text: "Perfect".to_string(),
                    problems: vec![],
                }),
            },
        );

        let report = load_feedback(&mut session, &client, "sub42").await.unwrap();
        assert!(report.contains("success - 100%"));
        assert!(!session.is_loading_feedback());

        // A second request while one is in flight is swallowed
        session.set_loading_feedback(true);
        assert!(load_feedback(&mut session, &client, "sub42").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_submission_collapses_to_one_line() {
        let mut session = StudioSession::new("task1", Box::new(BufferEditorFactory));
        let client = MockService::new();

        let report = load_feedback(&mut session, &client, "missing").await.unwrap();
        assert_eq!(report, RETRIEVAL_ERROR);
        assert!(!session.is_loading_feedback());
    }

    #[test]
    fn test_format_feedback_lists_subproblems_in_order() {
        let data = FeedbackData {
            result: "success".to_string(),
            grade: 87.5,
            text: "Well done".to_string(),
            problems: vec!["q1 ok".to_string(), "q2 partial".to_string()],
        };

        let report = format_feedback(&data);
        assert!(report.contains("success - 87.5%"));
        assert!(report.contains("Feedback - subproblem 0\nq1 ok"));
        assert!(report.contains("Feedback - subproblem 1\nq2 partial"));
        let top = report.find("Feedback - top").unwrap();
        let first = report.find("Feedback - subproblem 0").unwrap();
        assert!(top < first);
    }
}
