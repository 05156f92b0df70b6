//! Recap CLI: one-shot meeting transcript analysis.
//!
//! Usage:
//!   recap --text notes.txt            Analyze a transcript file
//!   recap --text -                    Analyze transcript text from stdin
//!   recap --audio meeting.wav         Transcribe the recording first, then analyze
//!
//! Prints the full result bundle as pretty JSON on stdout; `--out FILE`
//! writes it to a file instead. Model endpoints and pipeline knobs come
//! from the environment (see RECAP_* variables in recap-core).

use recap_core::backends::{RemoteTranscriber, TranscriptionBackend};
use recap_core::{Pipeline, PipelineInput};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

fn usage() {
    eprintln!("Recap — meeting transcript analysis");
    eprintln!("  --text FILE     Analyze a transcript file (\"-\" reads stdin)");
    eprintln!("  --audio FILE    Transcribe an audio file, then analyze it");
    eprintln!("  --out FILE      Write the JSON result to FILE instead of stdout");
    eprintln!();
    eprintln!("Remote models: RECAP_HF_API_URL / RECAP_HF_API_KEY for analysis,");
    eprintln!("RECAP_STT_API_URL / RECAP_STT_API_KEY for --audio transcription.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut text_path: Option<String> = None;
    let mut audio_path: Option<String> = None;
    let mut out_path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--text" => text_path = args.next(),
            "--audio" => audio_path = args.next(),
            "--out" => out_path = args.next().map(PathBuf::from),
            "--help" | "-h" => {
                usage();
                return Ok(());
            }
            other => {
                eprintln!("unknown argument: {other}");
                usage();
                std::process::exit(2);
            }
        }
    }

    let input = match (text_path, audio_path) {
        (Some(path), None) => {
            let text = if path == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&path)?
            };
            PipelineInput::Text(text)
        }
        (None, Some(path)) => {
            let transcriber = RemoteTranscriber::from_env()?;
            info!(path, "transcribing audio");
            let (text, segments) = transcriber.transcribe(&path).await?;
            PipelineInput::Transcribed { text, segments }
        }
        _ => {
            usage();
            std::process::exit(2);
        }
    };

    let pipeline = Pipeline::from_env()?;
    let result = pipeline.run(input).await?;

    let json = serde_json::to_string_pretty(&result)?;
    match out_path {
        Some(path) => {
            std::fs::write(&path, &json)?;
            info!(path = %path.display(), "result written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
