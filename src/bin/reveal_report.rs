use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use textsync::{
    build_timeline, resolve_display, Chunk, SentenceState, TimelineConfig, TimingTrack,
};

/// Builds the timeline for a chunk metadata file and reports the reveal
/// state at sampled playback times, as JSON on stdout.
#[derive(Debug, Parser)]
#[command(name = "reveal_report")]
struct Args {
    /// Chunk metadata JSON file.
    chunk: PathBuf,
    /// Timing track to build against.
    #[arg(long, value_enum, default_value = "translation")]
    track: TrackChoice,
    /// Build the timeline with combined original+translation phases.
    #[arg(long)]
    combined: bool,
    /// True audio duration in seconds, when known.
    #[arg(long)]
    audio_duration: Option<f64>,
    /// Sampling step in seconds.
    #[arg(long, default_value_t = 0.5)]
    step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum TrackChoice {
    Original,
    Translation,
    Mix,
}

impl TrackChoice {
    fn timing_track(self) -> TimingTrack {
        match self {
            Self::Original => TimingTrack::Original,
            Self::Translation => TimingTrack::Translation,
            Self::Mix => TimingTrack::Mix,
        }
    }
}

#[derive(Serialize)]
struct Report {
    generated_at: String,
    chunk_id: String,
    track: String,
    combined: bool,
    sentence_count: usize,
    timeline_end: f64,
    samples: Vec<Sample>,
}

#[derive(Serialize)]
struct Sample {
    time: f64,
    effective_time: f64,
    active_index: usize,
    sentences: Vec<SampleSentence>,
}

#[derive(Serialize)]
struct SampleSentence {
    index: usize,
    state: &'static str,
    variants: Vec<SampleVariant>,
}

#[derive(Serialize)]
struct SampleVariant {
    kind: String,
    revealed: usize,
    total: usize,
    current_index: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let chunk = Chunk::load(&args.chunk)?;
    let config = TimelineConfig::default();
    let track = args.track.timing_track();
    let runtimes = build_timeline(
        &chunk.sentences,
        track,
        args.audio_duration,
        args.combined,
        &config,
    )
    .ok_or("chunk has no sentences")?;

    let timeline_end = runtimes.iter().fold(0.0f64, |acc, r| acc.max(r.end_time));
    let step = if args.step > 0.0 { args.step } else { 0.5 };

    let mut samples = Vec::new();
    let mut time = 0.0f64;
    while time <= timeline_end + step {
        if let Some(display) = resolve_display(&runtimes, time, args.audio_duration, &config) {
            samples.push(Sample {
                time,
                effective_time: display.effective_time,
                active_index: display.active_index,
                sentences: display
                    .sentences
                    .iter()
                    .map(|sentence| SampleSentence {
                        index: sentence.index,
                        state: match sentence.state {
                            SentenceState::Past => "past",
                            SentenceState::Active => "active",
                            SentenceState::Future => "future",
                        },
                        variants: sentence
                            .variants
                            .iter()
                            .map(|variant| SampleVariant {
                                kind: format!("{:?}", variant.kind).to_lowercase(),
                                revealed: variant.revealed_count,
                                total: variant.tokens.len(),
                                current_index: variant.current_index,
                            })
                            .collect(),
                    })
                    .collect(),
            });
        }
        time += step;
    }

    let report = Report {
        generated_at: Utc::now().to_rfc3339(),
        chunk_id: chunk.id,
        track: format!("{track:?}").to_lowercase(),
        combined: args.combined,
        sentence_count: runtimes.len(),
        timeline_end,
        samples,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
