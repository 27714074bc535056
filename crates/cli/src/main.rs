use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use speech_bridge_core::audio::domain::audio_decoder::AudioDecoder;
use speech_bridge_core::audio::infrastructure::pcm_wav_decoder::PcmWavDecoder;
use speech_bridge_core::engine::domain::accelerator::Accelerator;
use speech_bridge_core::engine::domain::inference_backend::InferenceBackend;
use speech_bridge_core::engine::infrastructure::whisper_backend::WhisperBackend;
use speech_bridge_core::shared::config::BridgeConfig;
use speech_bridge_core::shared::model_catalog::{self, MODEL_OPTIONS};
use speech_bridge_core::shared::model_resolver::ModelResolver;
use speech_bridge_core::transcription::chunk_transcriber::{ChunkResult, ChunkTranscriber};
use speech_bridge_core::SpeechBridge;

/// Offline speech-to-text for 16 kHz PCM WAV files.
#[derive(Parser)]
#[command(name = "speech-bridge")]
struct Cli {
    /// Model file to load (overrides --model-id and the config file).
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Catalog model id, downloaded on first use.
    #[arg(long, global = true)]
    model_id: Option<String>,

    /// Skip the GPU and load the model on the CPU.
    #[arg(long, global = true)]
    cpu: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a WAV file in one pass.
    Transcribe {
        /// Input WAV file (16-bit PCM, 16 kHz).
        input: PathBuf,
    },
    /// Transcribe a WAV file chunk by chunk with the low-latency profile.
    Stream {
        input: PathBuf,

        /// Chunk length in seconds (defaults to the config value).
        #[arg(long)]
        chunk_seconds: Option<u32>,
    },
    /// List downloadable models.
    Models,
    /// Download a model into the cache.
    Fetch {
        /// Catalog model id, e.g. `base.en`.
        id: String,
    },
    /// Show which hardware path the engine was built for.
    Info,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = BridgeConfig::load();
    if cli.cpu {
        config.use_gpu = false;
    }
    if let Some(id) = &cli.model_id {
        config.model_id = id.clone();
        config.model_path = None;
    }
    if let Some(path) = &cli.model {
        config.model_path = Some(path.clone());
    }

    match cli.command {
        Command::Transcribe { input } => run_transcribe(&input, &config),
        Command::Stream {
            input,
            chunk_seconds,
        } => {
            if let Some(seconds) = chunk_seconds {
                config.stream_chunk_seconds = seconds;
            }
            run_stream(&input, &config)
        }
        Command::Models => {
            list_models();
            Ok(())
        }
        Command::Fetch { id } => {
            let option = model_catalog::find_by_id(&id)
                .ok_or_else(|| format!("Unknown model id '{id}'. Run `models` to list them."))?;
            let path = ModelResolver::new()?
                .resolve_option(option, Some(Box::new(download_progress)))?;
            eprintln!();
            println!("{}", path.display());
            Ok(())
        }
        Command::Info => {
            let info = WhisperBackend::new().system_info();
            println!("{info}");
            println!("Accelerator: {}", Accelerator::from_system_info(&info));
            Ok(())
        }
    }
}

fn run_transcribe(input: &Path, config: &BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_input(input)?;
    let bridge = load_bridge(config)?;

    let result = bridge.transcribe_file(input);
    bridge.release();
    let transcript = result?;
    log::info!("{} segments", transcript.segment_count());
    println!("{}", transcript.text.trim());
    Ok(())
}

fn run_stream(input: &Path, config: &BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_input(input)?;
    let audio = PcmWavDecoder::new().decode_file(input)?;
    let bridge = Arc::new(load_bridge(config)?);

    let transcriber = ChunkTranscriber::with_settings(bridge.clone(), config.min_chunk_samples, 4);
    let chunk_len = config.stream_chunk_samples();
    log::info!(
        "Streaming {:.1}s of audio in {}-sample chunks",
        audio.duration(),
        chunk_len
    );

    let mut submitted = 0;
    for chunk in audio.chunks(chunk_len) {
        if !transcriber.submit(chunk.to_vec()) {
            break;
        }
        submitted += 1;
        while let Ok(result) = transcriber.results().try_recv() {
            print_chunk(&result);
        }
    }
    for result in transcriber.finish() {
        print_chunk(&result);
    }

    log::info!("Streamed {submitted} chunks");
    bridge.release();
    Ok(())
}

fn print_chunk(result: &ChunkResult) {
    match &result.outcome {
        Ok(t) if t.is_empty() => {}
        Ok(t) => println!("[{}] {}", result.index, t.text.trim()),
        Err(e) => eprintln!("[{}] Error: {e}", result.index),
    }
}

fn load_bridge(config: &BridgeConfig) -> Result<SpeechBridge, Box<dyn std::error::Error>> {
    let model_path = match &config.model_path {
        Some(path) => path.clone(),
        None => {
            let option = model_catalog::resolve_or_default(&config.model_id);
            log::info!("Resolving model: {}", option.file_name());
            let path = ModelResolver::new()?
                .resolve_option(option, Some(Box::new(download_progress)))?;
            eprintln!();
            path
        }
    };

    let bridge = SpeechBridge::new(Box::new(WhisperBackend::new()), config);
    let loaded = bridge.try_initialize(&model_path)?;
    log::info!(
        "Loaded {} on {}",
        loaded.model_path.display(),
        loaded.execution
    );
    Ok(bridge)
}

fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    let is_wav = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if !is_wav {
        log::warn!("{} does not have a .wav extension", input.display());
    }
    Ok(())
}

fn list_models() {
    let default_id = model_catalog::default_option().id;
    for option in MODEL_OPTIONS {
        let marker = if option.id == default_id { "*" } else { " " };
        println!("{marker} {:<16} {}", option.id, option.details);
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}
