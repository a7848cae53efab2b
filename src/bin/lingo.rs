// Line-oriented front end for the message-processing core.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use lingo::ai::AiServiceClient;
use lingo::core::config::AppConfig;
use lingo::core::controller::OperationResult;
use lingo::core::language::{SUPPORTED_LANGUAGES, display_name};
use lingo::core::preferences::{PreferenceStore, Theme, View};
use lingo::core::{
    EntryId, LanguageSelectionFlow, MessageEntry, OperationController, OperationRequest,
    RunOutcome, SelectionState,
};
use lingo::errors::LingoError;

const HELP: &str = "\
Type text to submit it. Commands:
  :list                 show all messages
  :summarize N          summarize message N
  :translate N          pick a target language for message N
  :choose CODE          translate into CODE (after :translate)
  :cancel               close the language prompt
  :delete N             remove message N
  :languages            list selectable languages
  :theme light|dark     change theme
  :view text|summarize  change view
  :quit                 exit";

struct Session {
    controller: OperationController,
    selection: LanguageSelectionFlow,
    preferences: PreferenceStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    let client = AiServiceClient::from_config(&config).context("Failed to build AI client")?;
    let controller = OperationController::new(client).with_timeout(config.operation_timeout);
    let preferences = PreferenceStore::load(&config.preferences_path);
    info!(
        path = %preferences.path().display(),
        theme = ?preferences.get().theme,
        view = ?preferences.get().view,
        "Loaded preferences"
    );

    let mut session = Session {
        controller,
        selection: LanguageSelectionFlow::new(),
        preferences,
    };

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line == ":quit" {
            break;
        }
        if let Err(e) = session.handle(line).await {
            println!("! {e}");
        }
    }

    Ok(())
}

fn parse_id(arg: Option<&str>) -> Result<EntryId> {
    arg.and_then(|raw| raw.parse().ok())
        .map(EntryId)
        .context("Expected a message number, e.g. :summarize 2")
}

impl Session {
    async fn handle(&mut self, line: &str) -> Result<()> {
        if !line.starts_with(':') {
            match self.controller.submit(line).await {
                Some(submission) => {
                    report(submission.detection);
                    self.print_entry(submission.id);
                }
                None => println!("(nothing to submit)"),
            }
            return Ok(());
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();

        match command {
            ":list" => {
                for entry in self.controller.entries() {
                    self.print(&entry);
                }
            }
            ":summarize" => {
                let id = parse_id(arg)?;
                report(self.controller.run(id, OperationRequest::Summarize).await);
                self.print_entry(id);
            }
            ":translate" => {
                let id = parse_id(arg)?;
                if self.controller.entry(id).is_none() {
                    return Err(LingoError::NotFound(id).into());
                }
                if self.selection.request_translate(id) {
                    println!(
                        "Choose a language for #{id} (suggested: {}) with :choose CODE",
                        self.selection.suggested_target()
                    );
                } else if let SelectionState::Selecting { entry_id } = self.selection.state() {
                    println!("Finish choosing a language for #{entry_id} first");
                }
            }
            ":choose" => {
                let code = arg.unwrap_or_else(|| self.selection.suggested_target()).to_string();
                let target = self.selection.state();
                report(self.selection.choose(&self.controller, &code).await);
                if let SelectionState::Selecting { entry_id } = target {
                    self.print_entry(entry_id);
                }
            }
            ":cancel" => {
                if self.selection.cancel().is_none() {
                    println!("(no language prompt open)");
                }
            }
            ":delete" => {
                let id = parse_id(arg)?;
                if !self.controller.delete(id) {
                    return Err(LingoError::NotFound(id).into());
                }
            }
            ":languages" => {
                for lang in SUPPORTED_LANGUAGES {
                    println!("  {}  {}", lang.code, lang.name);
                }
            }
            ":theme" => {
                let theme = arg.unwrap_or_default().parse::<Theme>()?;
                self.preferences.set_theme(theme)?;
            }
            ":view" => {
                let view = arg.unwrap_or_default().parse::<View>()?;
                self.preferences.set_view(view)?;
            }
            _ => println!("{HELP}"),
        }
        Ok(())
    }

    fn print_entry(&self, id: EntryId) {
        if let Some(entry) = self.controller.entry(id) {
            self.print(&entry);
        }
    }

    fn print(&self, entry: &MessageEntry) {
        println!("#{} {}", entry.id, entry.source_text);
        let language = entry
            .detected_language
            .as_deref()
            .map_or_else(|| "unknown".to_string(), display_name);
        println!("   language: {language}");
        if let Some(translation) = &entry.translation {
            println!(
                "   translation ({}): {}",
                translation.target_language, translation.text
            );
        }
        if self.preferences.get().view == View::Summarize {
            match &entry.summary {
                Some(summary) => println!("   summary: {summary}"),
                None if self.controller.can_summarize(entry.id) => {
                    println!("   (summary available: :summarize {})", entry.id);
                }
                None => {}
            }
        }
        if let Some(err) = &entry.operation_error {
            println!("   last error: {}", err.message);
        }
    }
}

fn report(result: Result<RunOutcome, LingoError>) {
    match result {
        Ok(RunOutcome::Succeeded(OperationResult::Detected(code))) => {
            println!("Detected {}", display_name(&code));
        }
        Ok(RunOutcome::Succeeded(_)) => {}
        Ok(RunOutcome::Failed(err)) => println!("! {}", err.message),
        Err(e) => {
            error!(error = %e, "Operation rejected");
            println!("! {e}");
        }
    }
}
