//! voicegate - voice-biometric gate for developer mode.
//!
//! Drives enrollment and authentication from recorded audio: the PCM file
//! plays the capture collaborator, `--transcript` plays the recognizer.
//! State-change events are printed as JSON lines.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voicegate_auth::{
    AuthConfig, AuthEvent, AuthOutcome, AuthStateMachine, PrivilegedSessionController,
};
use voicegate_store::{JsonFileStore, VoicePrintStore};

mod adapters;

use adapters::{FixedTranscriber, PcmFileSampler};

#[derive(Parser)]
#[command(name = "voicegate")]
#[command(about = "Voice-biometric gate for developer mode")]
#[command(version)]
struct Cli {
    /// Path of the enrolled voiceprint record
    #[arg(long, global = true, default_value = "voiceprint.json")]
    store: PathBuf,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new enrollment print (replaces any existing one)
    Enroll(AttemptArgs),
    /// Authenticate against the enrolled print
    Auth(AttemptArgs),
    /// Delete the enrolled print and rearm setup mode
    Reset,
    /// Show the enrollment record
    Status,
}

#[derive(clap::Args)]
struct AttemptArgs {
    /// Raw mono s16le PCM file holding the utterance
    audio: PathBuf,

    /// Finalized transcript of the utterance
    #[arg(long)]
    transcript: String,

    /// Sample rate of the PCM file in Hz
    #[arg(long, default_value_t = 16000)]
    rate: u32,

    /// Abort the attempt after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let store = Arc::new(JsonFileStore::new(&cli.store));

    match &cli.command {
        Commands::Enroll(args) => run_enroll(store, args).await,
        Commands::Auth(args) => run_auth(store, args).await,
        Commands::Reset => run_reset(store),
        Commands::Status => run_status(store.as_ref()),
    }
}

async fn run_enroll(store: Arc<JsonFileStore>, args: &AttemptArgs) -> Result<()> {
    let (mut machine, mut events) =
        AuthStateMachine::new(AuthConfig::default(), store)?;
    // Enrolling always replaces: drop any prior print first so the attempt
    // takes the setup branch.
    machine.reset_enrollment()?;

    let mut privileged = PrivilegedSessionController::new();
    let outcome = drive_attempt(&mut machine, args).await;
    drain_events(&mut events, &mut privileged)?;

    match outcome? {
        AuthOutcome::Enrolled if privileged.is_active() => {
            println!("enrolled; developer mode active");
            Ok(())
        }
        other => bail!("unexpected outcome: {other:?}"),
    }
}

async fn run_auth(store: Arc<JsonFileStore>, args: &AttemptArgs) -> Result<()> {
    let (mut machine, mut events) =
        AuthStateMachine::new(AuthConfig::default(), store)?;
    if machine.session().setup_mode {
        bail!("nothing enrolled; run `voicegate enroll` first");
    }

    let mut privileged = PrivilegedSessionController::new();
    let outcome = drive_attempt(&mut machine, args).await;
    drain_events(&mut events, &mut privileged)?;

    match outcome? {
        AuthOutcome::Authenticated { similarity } if privileged.is_active() => {
            println!("authenticated (similarity {similarity:.3}); developer mode active");
            Ok(())
        }
        other => bail!("unexpected outcome: {other:?}"),
    }
}

async fn drive_attempt(
    machine: &mut AuthStateMachine,
    args: &AttemptArgs,
) -> Result<AuthOutcome> {
    let sampler = PcmFileSampler::new(&args.audio, args.rate);
    let transcriber = FixedTranscriber::new(&args.transcript);

    let cancel = CancellationToken::new();
    if let Some(secs) = args.timeout_secs {
        let timed = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            timed.cancel();
        });
    }

    machine
        .run_attempt(&sampler, &transcriber, &cancel)
        .await
        .context("attempt failed")
}

fn run_reset(store: Arc<JsonFileStore>) -> Result<()> {
    let (mut machine, mut events) =
        AuthStateMachine::new(AuthConfig::default(), store)?;
    machine.reset_enrollment()?;
    drain_events(&mut events, &mut PrivilegedSessionController::new())?;
    println!("enrollment reset; setup mode rearmed");
    Ok(())
}

fn run_status(store: &JsonFileStore) -> Result<()> {
    match store.get()? {
        Some(print) => {
            println!("{}", serde_json::to_string_pretty(&print)?);
        }
        None => println!("nothing enrolled"),
    }
    Ok(())
}

fn drain_events(
    events: &mut mpsc::UnboundedReceiver<AuthEvent>,
    privileged: &mut PrivilegedSessionController,
) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        privileged.observe(&event);
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
