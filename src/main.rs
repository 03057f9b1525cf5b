// Beatsmith CLI
// Generate patterns, export MIDI, and dry-run playback from the terminal

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use beatsmith::commands::{self, CommandError, ExportMidiInput, GeneratePatternInput};
use beatsmith::config::EngineConfig;
use beatsmith::events::{Journal, JournalEntry, Notification};
use beatsmith::generator::{GeneratedPattern, PatternCache};
use beatsmith::groove::grid::{step_duration_secs, STEPS_PER_BAR};
use beatsmith::playback::LogSink;
use beatsmith::sequencer::{Sequencer, Transport};

/// Beatsmith - procedural beats and a step sequencer
#[derive(Parser)]
#[command(name = "beatsmith")]
#[command(about = "Procedural beat generator and step sequencer")]
#[command(version)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the style catalog
    Styles,

    /// Generate a pattern and print it as JSON
    Generate(GenerateArgs),

    /// Generate a pattern and write it as a Standard MIDI File
    ExportMidi {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Output file (defaults to <style>-<seed>.mid)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ticks per quarter note
        #[arg(long, default_value_t = 480)]
        ppq: u16,
    },

    /// Play through the sequencer, logging every trigger
    Play {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Bars to play before stopping
        #[arg(long, default_value_t = 4)]
        bars: usize,

        /// Load a drum preset instead of a generated pattern
        #[arg(long)]
        preset: Option<String>,

        /// Swing percentage (0-100)
        #[arg(long, default_value_t = 0.0)]
        swing: f64,

        /// Groove percentage (0-100)
        #[arg(long, default_value_t = 0.0)]
        groove: f64,

        /// Append notifications to this JSONL file
        #[arg(long)]
        journal: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct GenerateArgs {
    /// Style name, e.g. "Lo-fi chill" or "trap"
    #[arg(default_value = "Lo-fi chill")]
    style: String,

    /// Tempo override in BPM
    #[arg(long)]
    tempo: Option<f64>,

    /// Key override, e.g. "F#"
    #[arg(long)]
    key: Option<String>,

    /// "4/4", "3/4" or "6/8"
    #[arg(long)]
    time_signature: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Draw a fresh seed from the clock
    #[arg(long)]
    fresh: bool,
}

impl GenerateArgs {
    fn input(&self) -> GeneratePatternInput {
        GeneratePatternInput {
            style: self.style.clone(),
            tempo: self.tempo,
            time_signature: self.time_signature.clone(),
            key: self.key.clone(),
            seed: self.seed,
            fresh_seed: self.fresh,
            fallback_reason: None,
        }
    }
}

fn command_error(error: CommandError) -> anyhow::Error {
    anyhow!(error.message().to_string())
}

fn generate(cache: &mut PatternCache, args: &GenerateArgs) -> Result<Arc<GeneratedPattern>> {
    let pattern = commands::generate_pattern(cache, args.input()).map_err(command_error)?;
    for warning in &pattern.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(pattern)
}

fn default_midi_name(pattern: &GeneratedPattern) -> String {
    let slug: String = pattern
        .style
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}.mid", slug.trim_matches('-'), pattern.seed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut cache = PatternCache::new(&config.cache, config.generator.clone());

    match cli.command {
        Commands::Styles => {
            for style in commands::list_styles().map_err(command_error)? {
                println!(
                    "{:<14} {:>3} BPM  {:<2} {:<5}  {}",
                    style.name,
                    style.bpm,
                    style.key,
                    style.scale.name(),
                    style.description
                );
            }
            Ok(())
        }
        Commands::Generate(args) => {
            let pattern = generate(&mut cache, &args)?;
            println!("{}", serde_json::to_string_pretty(&*pattern)?);
            Ok(())
        }
        Commands::ExportMidi {
            generate: args,
            output,
            ppq,
        } => {
            let pattern = generate(&mut cache, &args)?;
            let output = output.unwrap_or_else(|| PathBuf::from(default_midi_name(&pattern)));
            let dir = output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let filename = output
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid output path {}", output.display()))?;

            let mut input = ExportMidiInput::new((*pattern).clone());
            input.ppq = Some(ppq);
            let exported =
                commands::export_pattern_midi_to(dir, filename, &input).map_err(command_error)?;
            println!(
                "{} ({} bytes, sha256 {})",
                exported.path.display(),
                exported.bytes,
                exported.sha256
            );
            Ok(())
        }
        Commands::Play {
            generate: args,
            bars,
            preset,
            swing,
            groove,
            journal,
        } => {
            let mut sequencer = Sequencer::new(config.sequencer.clone(), Box::new(LogSink));
            match preset {
                Some(name) => {
                    sequencer
                        .load_preset(&name)
                        .map_err(|e| anyhow!(e.to_string()))?;
                    if let Some(tempo) = args.tempo {
                        sequencer.set_tempo(tempo);
                    }
                }
                None => {
                    let pattern = generate(&mut cache, &args)?;
                    commands::load_pattern(&mut sequencer, &pattern).map_err(command_error)?;
                }
            }
            sequencer.set_swing(swing);
            sequencer.set_groove(groove);
            play(sequencer, bars, journal.map(Journal::new)).await
        }
    }
}

async fn play(mut sequencer: Sequencer, bars: usize, journal: Option<Journal>) -> Result<()> {
    let mut rx = sequencer.subscribe();
    let bpm = sequencer.state().bpm;
    let steps = bars * STEPS_PER_BAR;

    let mut transport = Transport::new(sequencer);
    transport.play();

    let mut played = 0;
    while played < steps {
        let Some(notification) = rx.recv().await else {
            break;
        };
        if matches!(notification, Notification::StepTriggered { .. }) {
            played += 1;
        }
        if let Some(journal) = &journal {
            journal.write(&JournalEntry::new(notification))?;
        }
    }

    // Let the last step ring out so its flams and rolls land
    tokio::time::sleep(Duration::from_secs_f64(step_duration_secs(bpm))).await;
    transport.stop();

    if let Some(journal) = &journal {
        journal.record_pending(&mut rx)?;
        log::info!("Journal written to {}", journal.path().display());
    }
    Ok(())
}
