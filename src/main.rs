use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use focusmate_gateway::Config;
use focusmate_gateway::api::{ApiServerBuilder, ApiState};

/// FocusMate - prompt and voice gateway for Gemini and Google Cloud speech
#[derive(Parser)]
#[command(name = "focusmate", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, env = "FOCUSMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send a prompt to Gemini and print the reply
    Generate {
        /// Prompt text
        prompt: String,
    },
    /// Synthesize speech for some text
    Synthesize {
        /// Text to speak
        text: String,
        /// Write decoded MP3 here instead of printing base64
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Transcribe a recorded WEBM/Opus file
    Transcribe {
        /// Path to the recording
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,focusmate_gateway=info",
        1 => "info,focusmate_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    let state = ApiState::from_config(&config)?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Generate { prompt } => cmd_generate(&state, &prompt).await,
            Command::Synthesize { text, out } => cmd_synthesize(&state, &text, out).await,
            Command::Transcribe { file } => cmd_transcribe(&state, &file).await,
        };
    }

    let port = cli.port.unwrap_or(config.server.port);
    let bind = cli.bind.unwrap_or(config.server.bind);

    tracing::info!(
        bind = %bind,
        port,
        timeout_secs = config.server.timeout.as_secs(),
        "starting focusmate gateway"
    );

    ApiServerBuilder::new(state, port)
        .bind(bind)
        .static_dir(config.server.static_dir)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Print Gemini's reply to a prompt
async fn cmd_generate(state: &ApiState, prompt: &str) -> anyhow::Result<()> {
    let reply = state.generation.try_generate(prompt).await?;
    println!("{reply}");
    Ok(())
}

/// Print base64 audio, or write the decoded MP3 to `out`
async fn cmd_synthesize(state: &ApiState, text: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let audio = state.synthesis.try_synthesize(text).await?;

    match out {
        Some(path) => {
            let mp3 = STANDARD.decode(audio.as_bytes())?;
            std::fs::write(&path, &mp3)?;
            println!("Wrote {} bytes of MP3 to {}", mp3.len(), path.display());
        }
        None => println!("{audio}"),
    }

    Ok(())
}

/// Print the transcript of a local recording
async fn cmd_transcribe(state: &ApiState, file: &std::path::Path) -> anyhow::Result<()> {
    let recording = std::fs::read(file)?;
    let transcript = state
        .transcription
        .try_transcribe(&STANDARD.encode(&recording))
        .await?;
    println!("{transcript}");
    Ok(())
}
