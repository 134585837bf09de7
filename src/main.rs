use std::io::{self, BufRead, Write};
use std::sync::Arc;

use coda::commands::{parse_slash_command, SlashCommand};
use coda::credentials::{CredentialPrompt, CredentialStore, FileCredentialStore};
use coda::fix::{FixConfirmation, FixOutcome, FixReview, Selection, SelectionRange};
use coda::providers::{provider_from_env, HostConfig};
use coda::session::SessionCoordinator;
use coda::sidebar::{ChannelSink, UiEvent};
use conversation_store::ConversationStore;

const HELP_TEXT: &str = "Commands: /help, /models, /model <id>, /clear, /key set <value>, /key clear, /fix <language> <path>, /quit";

struct StdinPrompt;

impl CredentialPrompt for StdinPrompt {
    fn request_api_key(&self) -> Option<String> {
        eprint!("Gemini API key (empty to cancel): ");
        let _ = io::stderr().flush();

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

struct StdinReview;

impl FixReview for StdinReview {
    fn review(&self, original: &str, fixed: &str, explanation: &str) -> FixConfirmation {
        println!("--- current selection ---");
        println!("{original}");
        println!("--- proposed fix ---");
        println!("{fixed}");
        if !explanation.is_empty() {
            println!("--- explanation ---");
            println!("{explanation}");
        }

        if confirm("Apply fix?") {
            FixConfirmation::Accept
        } else {
            FixConfirmation::Discard
        }
    }
}

fn confirm(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = io::stderr().flush();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }

    matches!(line.trim(), "y" | "Y" | "yes")
}

fn render_event(event: UiEvent) {
    match event {
        UiEvent::AddUserMessage(turn) | UiEvent::AddMessage(turn) => {
            println!("[{}] {}", turn.role.as_str(), turn.text);
        }
        UiEvent::ReplaceLastMessage(turn) => {
            println!("[{}] {}", turn.role.as_str(), turn.text);
        }
        UiEvent::UpdateModels {
            models,
            current_model,
        } => {
            println!("models: {} (current: {current_model})", models.join(", "));
        }
        UiEvent::LoadHistory(turns) => {
            for turn in turns {
                println!("[{}] {}", turn.role.as_str(), turn.text);
            }
        }
    }
}

async fn run_fix(
    coordinator: &SessionCoordinator,
    language_id: String,
    path: String,
) -> io::Result<()> {
    let contents = std::fs::read_to_string(&path)?;
    let selection = Selection {
        text: contents.clone(),
        language_id,
        range: SelectionRange {
            start: 0,
            end: contents.len(),
        },
    };

    match coordinator
        .fix_selection(&contents, selection, &StdinReview)
        .await
    {
        FixOutcome::Applied { document } => {
            std::fs::write(&path, document)?;
            println!("Applied fix to {path}");
        }
        FixOutcome::Discarded => println!("Fix discarded; {path} left unmodified"),
        FixOutcome::ExplanationOnly { explanation } => {
            println!("No fix needed: {explanation}");
        }
        FixOutcome::Unstructured { raw } => {
            println!("Model reply was not structured; raw output:\n{raw}");
        }
        FixOutcome::NoUsableOutput => println!("The model gave no usable output"),
        FixOutcome::Failed { message } => println!("Fix failed: {message}"),
        FixOutcome::Aborted => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let workspace = std::env::current_dir()?;
    let config = HostConfig::from_env().map_err(io::Error::other)?;
    let provider = provider_from_env(&config).map_err(io::Error::other)?;
    let store = ConversationStore::open(&workspace).map_err(io::Error::other)?;
    let credentials = Arc::new(FileCredentialStore::new(&workspace));

    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            render_event(event);
        }
    });

    let coordinator = Arc::new(SessionCoordinator::new(
        provider,
        store,
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::new(StdinPrompt),
        Arc::new(ChannelSink::new(sender)),
    ));
    if let Some(model) = &config.model {
        coordinator.set_model(model);
    }
    coordinator.webview_ready();

    println!("CoDa chat. {HELP_TEXT}");
    let stdin = io::stdin();

    loop {
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }

        let Some(command) = parse_slash_command(&input) else {
            // Submissions are independent tasks; a second one while the
            // first is in flight is allowed to interleave.
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator.ask_from_prompt(input).await;
            });
            continue;
        };

        match command {
            SlashCommand::Help => println!("{HELP_TEXT}"),
            SlashCommand::Models => {
                println!(
                    "models: {} (current: {})",
                    coordinator.model_ids().join(", "),
                    coordinator.current_model()
                );
            }
            SlashCommand::Model(model_id) => {
                coordinator.set_model(&model_id);
                println!("model set to {}", coordinator.current_model());
            }
            SlashCommand::Clear => {
                if confirm("Clear chat history?") {
                    coordinator.clear_history();
                    println!("History cleared");
                }
            }
            SlashCommand::KeySet(value) => match credentials.set(&value) {
                Ok(()) => println!("API key stored"),
                Err(error) => println!("Failed to store API key: {error}"),
            },
            SlashCommand::KeyClear => match credentials.clear() {
                Ok(()) => println!("API key cleared"),
                Err(error) => println!("Failed to clear API key: {error}"),
            },
            SlashCommand::Fix { language_id, path } => {
                if let Err(error) = run_fix(&coordinator, language_id, path).await {
                    println!("Fix failed: {error}");
                }
            }
            SlashCommand::Quit => break,
            SlashCommand::Unknown(command) => println!("Unknown command: {command}"),
        }
    }

    printer.abort();
    Ok(())
}
