use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use route_core::{
    config::{load_settings, load_settings_from},
    validator::{is_valid, reserved_chars_hint},
    AzureCompletionClient, CompletionConfig, CompletionService, RouteSession, ShortcutAction,
    SubmitOutcome,
};
use shared::domain::{ChatMessage, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod repl;

use repl::{ReplCommand, HELP};

#[derive(Parser, Debug)]
#[command(
    name = "route-planner",
    about = "Ordena una lista de direcciones con ayuda de un modelo de lenguaje"
)]
struct Args {
    /// Settings file with endpoint, deployment, api_version and api_key.
    /// Defaults to `route_planner.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Submit these addresses once and exit instead of starting the prompt.
    #[arg(long = "address", short = 'a')]
    addresses: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
        None => load_settings(),
    };
    let config = CompletionConfig::from_settings(settings)
        .context("completion service is not configured")?;
    tracing::info!(?config, "completion service configured");

    let mut session = RouteSession::new(AzureCompletionClient::new(config));

    if args.addresses.is_empty() {
        run_interactive(&mut session).await
    } else {
        run_once(&mut session, &args.addresses).await
    }
}

async fn run_once<S: CompletionService>(
    session: &mut RouteSession<S>,
    addresses: &[String],
) -> Result<()> {
    for (index, address) in addresses.iter().enumerate() {
        if index > 0 {
            session.add_entry();
        }
        session.edit_entry(index, address.as_str());
    }

    let outcome = session.submit().await;
    print_messages(&session.state().transcript()[1..]);

    match outcome {
        SubmitOutcome::Answered => Ok(()),
        _ => {
            print_rows(session);
            match session.state().last_error() {
                Some(err) => bail!("{}", err.message),
                None => bail!("route was not submitted"),
            }
        }
    }
}

async fn run_interactive<S: CompletionService>(session: &mut RouteSession<S>) -> Result<()> {
    print_messages(session.state().transcript());
    println!("{HELP}");
    print_rows(session);

    let mut shown = session.state().transcript().len();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        session.clear_expired_error();
        let last = session.state().entries().len() - 1;

        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Show => {}
            ReplCommand::SetLast(value) => {
                session.edit_entry(last, value);
            }
            ReplCommand::Edit { index, value } => {
                if !session.edit_entry(index, value) {
                    println!("No existe la fila {}", index + 1);
                }
            }
            ReplCommand::Add => session.add_entry(),
            ReplCommand::Remove(index) => {
                if !session.remove_entry(index) {
                    println!("No se puede eliminar la fila {}", index + 1);
                }
            }
            ReplCommand::Submit => {
                let outcome = submit_with_spinner(session).await;
                report(session, outcome);
            }
            ReplCommand::Enter => {
                let state = session.state();
                if state.can_submit() && is_valid(&state.entries()[last].value) {
                    println!("Buscando ruta...");
                }
                if let ShortcutAction::Submitted(outcome) =
                    session.handle_editing_shortcut(last).await
                {
                    report(session, outcome);
                }
            }
            ReplCommand::Unknown(raw) => println!("Comando desconocido: {raw} (usa :help)"),
        }

        let transcript = session.state().transcript();
        if transcript.len() > shown {
            print_messages(&transcript[shown..]);
            shown = transcript.len();
        }
        print_rows(session);
    }

    Ok(())
}

async fn submit_with_spinner<S: CompletionService>(session: &mut RouteSession<S>) -> SubmitOutcome {
    if session.state().can_submit() {
        println!("Buscando ruta...");
    }
    session.submit().await
}

fn report<S: CompletionService>(session: &RouteSession<S>, outcome: SubmitOutcome) {
    tracing::debug!(?outcome, "submission finished");
    if let Some(err) = session.state().last_error() {
        println!("! {}", err.message);
    }
}

fn print_messages(messages: &[ChatMessage]) {
    for message in messages {
        let speaker = match message.role {
            Role::System => "*",
            Role::User => "tú",
            Role::Assistant => "asistente",
        };
        println!("[{speaker}] {}", message.content);
    }
}

fn print_rows<S: CompletionService>(session: &RouteSession<S>) {
    for (index, entry) in session.state().entries().iter().enumerate() {
        let marker = if entry.is_invalid { "!" } else { " " };
        println!("{marker} Dirección {}: {}", index + 1, entry.value);
        if entry.is_invalid {
            println!("    {}", reserved_chars_hint());
        }
    }
}
