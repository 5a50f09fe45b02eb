//! Veritas CLI
//!
//! Usage:
//!   veritas --frames capture.jsonl                      # replay landmark frames
//!   veritas --frames - --transcripts call.txt           # frames on stdin, scripted audio
//!   veritas --frames capture.jsonl --realtime --json    # paced replay, JSON verdicts

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use veritas::core::{
    risk_channel, spawn_audio_pipeline, FrameSource, LandmarkProvider, LivenessMonitor,
    PipelineStats, ReplayDetector, RiskReader, ScriptedUtterances, SilentSource,
    TextRiskClassifier,
};
use veritas::types::{SessionPhase, Verdict};
use veritas::{Settings, VERSION};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "veritas",
    version = VERSION,
    about = "Veritas - live proof-of-human verification with audio scam-risk fusion",
    long_about = "Veritas issues liveness challenges (blink, turn left, turn right) against a\n\
                  stream of face landmarks while an audio task scores the subject's speech\n\
                  for scam risk. Every frame yields one verdict.\n\n\
                  Verdicts:\n  \
                  SCANNING SUBJECT...        - No face in frame\n  \
                  ACTION: <challenge>        - Challenge in progress\n  \
                  IDENTITY CONFIRMED [SAFE]  - Verified, risk at or below limit\n  \
                  !!! SCAM DETECTED !!!      - Verified, risk above limit"
)]
struct Args {
    /// JSON-lines landmark frames ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    frames: String,

    /// Scripted utterances, one per line (silent microphone if absent)
    #[arg(short, long)]
    transcripts: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini API key for the remote classifier
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the scam score limit
    #[arg(long)]
    scam_limit: Option<u8>,

    /// Override the blink threshold
    #[arg(long)]
    blink_threshold: Option<f64>,

    /// Disable cosmetic liveness jitter
    #[arg(long)]
    no_jitter: bool,

    /// Sleep between frames according to their t_ms
    #[arg(long)]
    realtime: bool,

    /// Seconds of simulated speech per scripted utterance
    #[arg(long, default_value_t = 1)]
    speech_secs: u64,

    /// Print only when the verdict status changes
    #[arg(long)]
    quiet_frames: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let settings = load_settings(&args)?;
    if args.no_color {
        colored::control::set_override(false);
    }

    let (writer, reader) = risk_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let classifier = TextRiskClassifier::from_settings(&settings.classifier);
    info!(remote = classifier.has_remote(), version = VERSION, "veritas starting");

    let audio = match &args.transcripts {
        Some(path) => {
            let script = ScriptedUtterances::from_file(path)
                .with_context(|| format!("reading transcripts from {}", path.display()))?
                .with_pace(Duration::from_secs(args.speech_secs));
            spawn_audio_pipeline(script, classifier, writer, settings.audio.clone(), stop_rx)
        }
        None => spawn_audio_pipeline(SilentSource, classifier, writer, settings.audio.clone(), stop_rx),
    };

    let frame_args = args.clone();
    let frame_settings = settings.clone();
    let frames = tokio::task::spawn_blocking(move || run_frames(&frame_args, &frame_settings, reader));

    let interrupted = tokio::select! {
        result = frames => {
            result.context("frame loop panicked")??;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            true
        }
    };

    let _ = stop_tx.send(true);
    match tokio::time::timeout(Duration::from_secs(2), audio).await {
        Ok(Ok(stats)) => print_audio_summary(&stats),
        Ok(Err(e)) => warn!(error = %e, "audio task failed"),
        Err(_) => warn!("audio task did not stop in time"),
    }

    if interrupted {
        // A blocking stdin read cannot be cancelled
        std::process::exit(130);
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .with_target(false);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(limit) = args.scam_limit {
        settings.risk.scam_score_limit = limit;
    }
    if let Some(threshold) = args.blink_threshold {
        settings.liveness.blink_threshold = threshold;
    }
    if args.no_jitter {
        settings.liveness.jitter = false;
    }
    if args.api_key.is_some() {
        settings.classifier.api_key = args.api_key.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// Synchronous frame loop; returns when the frame input ends
fn run_frames(args: &Args, settings: &Settings, reader: RiskReader) -> anyhow::Result<()> {
    let input: Box<dyn BufRead> = if args.frames == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = std::fs::File::open(&args.frames)
            .with_context(|| format!("opening frames {}", args.frames))?;
        Box::new(BufReader::new(file))
    };

    let start = Instant::now();
    let mut source = FrameSource::new(input);
    let mut detector = ReplayDetector;
    let mut monitor = LivenessMonitor::new_at(settings, reader, start);
    let mut stdout = io::stdout();
    let mut last_status: Option<String> = None;

    while let Some(frame) = source.next_frame()? {
        let now = match (frame.t_ms, frame.captured_at(start)) {
            (_, Some(at)) => at,
            (Some(t), None) => {
                warn!(t_ms = t, "frame timestamp out of range, using wall clock");
                Instant::now()
            }
            (None, None) => Instant::now(),
        };
        if args.realtime {
            let wait = now.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }

        let face = detector.detect(&frame);
        let verdict = monitor.process_at(face.as_ref(), now);

        if args.quiet_frames && last_status.as_deref() == Some(verdict.status_text.as_str()) {
            continue;
        }
        last_status = Some(verdict.status_text.clone());
        print_verdict(&mut stdout, &verdict, args, settings)?;
    }

    if source.skipped() > 0 {
        warn!(skipped = source.skipped(), "malformed frames were skipped");
    }
    print_session_summary(&monitor);
    Ok(())
}

fn print_verdict(out: &mut impl Write, verdict: &Verdict, args: &Args, settings: &Settings) -> anyhow::Result<()> {
    if args.json {
        writeln!(out, "{}", serde_json::to_string(verdict)?)?;
    } else if args.no_color {
        writeln!(out, "{}", verdict.to_parseable_string())?;
    } else {
        writeln!(out, "{}", verdict.to_terminal_string(settings.risk.scam_score_limit))?;
    }
    Ok(())
}

fn print_session_summary(monitor: &LivenessMonitor) {
    let verified = monitor.phase() == SessionPhase::Verified;
    info!(
        frames = monitor.frames(),
        evaluated = monitor.engine().update_count(),
        challenge_index = monitor.engine().current_index(),
        verified,
        "frame input ended"
    );
}

fn print_audio_summary(stats: &PipelineStats) {
    info!(
        iterations = stats.iterations,
        classified = stats.classified,
        unavailable = stats.unavailable,
        listen_failures = stats.listen_failures,
        transcribe_failures = stats.transcribe_failures,
        "audio summary"
    );
}
