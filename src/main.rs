use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zapdesk::adapters::{FileStore, ReqwestHttpClient, TungsteniteRealtime};
use zapdesk::bootstrap::ensure_linked;
use zapdesk::cli::{handle_version_command, parse_args, parse_command, CliCommand, HELP, USAGE};
use zapdesk::cli_output::{
    icons, print_header, print_pairing_code, print_pairing_wait, print_step_line, Screen,
};
use zapdesk::config::ConsoleConfig;
use zapdesk::console::{Command, Console};
use zapdesk::error::ConsoleError;
use zapdesk::traits::{KeyValueStore, RealtimeConnection};

type BackendConsole = Console<ReqwestHttpClient>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    // stdout belongs to the console rendering
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zapdesk=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Wait out reconnects and pair the WhatsApp link when needed.
async fn link(console: &BackendConsole, config: &ConsoleConfig) -> Result<()> {
    let mut polls = 0usize;
    ensure_linked(
        console.api(),
        config,
        |code| {
            print_pairing_code(code);
            if let Err(e) = webbrowser::open(&code.image_url) {
                warn!("Could not open the QR code in a browser: {}", e);
            }
        },
        |status| {
            print_pairing_wait(polls, status);
            polls += 1;
        },
    )
    .await?;
    if polls > 0 {
        println!();
        print_step_line(icons::SUCCESS, "WhatsApp conectado");
    }
    Ok(())
}

/// Forward stdin lines to the console as commands.
fn spawn_input(commands: mpsc::Sender<Command>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            };
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if commands.send(command).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{}\n{}", e, HELP),
            }
        }
    });
}

/// How the interactive console ended, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Finished,
    /// No usable token; the agent has to run `zapdesk login` first.
    NeedsLogin,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Finished => ExitCode::SUCCESS,
            Outcome::NeedsLogin => ExitCode::from(1),
        }
    }
}

/// Startup failures that end with a hint instead of an error report.
fn startup_outcome(err: &ConsoleError) -> Option<Outcome> {
    err.requires_reauth().then_some(Outcome::NeedsLogin)
}

async fn run_console(mut console: BackendConsole, config: &ConsoleConfig) -> Result<Outcome> {
    link(&console, config).await?;

    if let Err(e) = console.initialize().await {
        print_step_line(icons::FAILURE, &e.user_message());
        println!("  {}", e.category().recovery_hint());
        if let Some(outcome) = startup_outcome(&e) {
            println!("  zapdesk login <token>");
            return Ok(outcome);
        }
        return Err(e.into());
    }
    info!("Console ready");

    let realtime = TungsteniteRealtime::start(config.realtime_config());

    let (tx, rx) = mpsc::channel(32);
    spawn_input(tx);

    let mut screen = Screen::new(std::io::stdout());
    console
        .run(
            config,
            Some(&realtime as &dyn RealtimeConnection),
            rx,
            |view| {
                if let Err(e) = screen.render(view) {
                    warn!("Render failed: {}", e);
                }
            },
        )
        .await?;

    if console.is_signed_out() {
        print_step_line(icons::WARNING, "Sessão encerrada");
    }
    Ok(Outcome::Finished)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let command = parse_args(std::env::args());
    match &command {
        CliCommand::Version => {
            handle_version_command();
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::Usage(reason) => {
            eprintln!("{}\n{}", reason, USAGE);
            return Ok(ExitCode::from(2));
        }
        _ => {}
    }

    color_eyre::install()?;
    init_tracing();

    let config = ConsoleConfig::from_env();
    let data_dir = config.data_dir().map_err(ConsoleError::from)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));
    let http = ReqwestHttpClient::with_client(
        reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
    );
    let mut console = Console::new(&config, http, store)?;

    match command {
        CliCommand::Login(token) => {
            console.login(&token)?;
            print_step_line(icons::SUCCESS, "Token salvo");
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Logout => {
            console.logout().await;
            print_step_line(icons::SUCCESS, "Sessão encerrada");
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Pair => {
            print_header("ZAPDESK");
            link(&console, &config).await?;
            print_step_line(icons::SUCCESS, "WhatsApp conectado");
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Run => Ok(run_console(console, &config).await?.exit_code()),
        CliCommand::Version | CliCommand::Usage(_) => Ok(ExitCode::SUCCESS),
    }
}
