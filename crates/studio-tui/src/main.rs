//! TUI binary entry point

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use studio_api_contract::{validate_task_id, LoadedProblem};
use studio_rest_client::{AuthConfig, StudioRestClient};
use studio_tui::App;

/// Command-line arguments
#[derive(Parser)]
#[command(name = "studio-tui")]
#[command(about = "Terminal studio for assembling exercise tasks")]
struct Args {
    /// Task-editing URL the session runs against
    #[arg(long)]
    task_url: String,

    /// Id of the task being edited
    #[arg(long)]
    task_id: String,

    /// API key for headless authentication
    #[arg(long)]
    api_key: Option<String>,

    /// JSON file with the task's existing subproblems
    #[arg(long)]
    problems: Option<PathBuf>,

    /// Print the feedback for an old submission and exit
    #[arg(long)]
    feedback: Option<String>,
}

fn load_problems(path: &PathBuf) -> anyhow::Result<Vec<LoadedProblem>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Same local check the browser applies before navigating to the studio
    if let Err(e) = validate_task_id(&args.task_id) {
        eprintln!("{e}");
        process::exit(1);
    }

    let auth = match args.api_key {
        Some(key) => AuthConfig::with_api_key(key),
        None => AuthConfig::default(),
    };

    let client = match StudioRestClient::from_url(&args.task_url, auth) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to create REST client: {}", e);
            process::exit(1);
        }
    };

    // Headless path: print one submission's feedback and exit
    if let Some(submission_id) = &args.feedback {
        let mut session = studio_core::StudioSession::new(
            args.task_id.as_str(),
            Box::new(studio_core::BufferEditorFactory),
        );
        match studio_core::load_feedback(&mut session, client.as_ref(), submission_id).await {
            Some(report) => println!("{report}"),
            None => eprintln!("A feedback request is already in flight"),
        }
        return;
    }

    let problems = match &args.problems {
        Some(path) => match load_problems(path) {
            Ok(problems) => problems,
            Err(e) => {
                eprintln!("Failed to load problems from {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    let mut app = match App::new(client, &args.task_id) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize TUI: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = app.run(&problems).await {
        eprintln!("TUI application error: {}", e);
        process::exit(1);
    }
}
