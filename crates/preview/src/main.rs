//! `rv-preview`: step a timeline document and print one JSON line per frame.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::Parser;
use serde_json::json;

use rv_audio::NullBackend;
use rv_common::{LoadMode, Rational, TimeCode};
use rv_media::FsLoader;
use rv_preview::{format_time, load_config, load_document, PlaybackClock, PreviewEngine};

/// How long to wait for the initial media loads before the first frame.
const WARMUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "rv-preview", version, about = "Evaluate a timeline document frame by frame")]
struct Cli {
    /// Timeline document JSON.
    timeline: PathBuf,

    /// Preview config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory media references resolve against (defaults to the document's directory).
    #[arg(long)]
    media_root: Option<PathBuf>,

    /// First frame time in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Last frame time in seconds (defaults to the document's end).
    #[arg(long)]
    end: Option<f64>,

    /// Frame rate override.
    #[arg(long)]
    fps: Option<u32>,

    /// Load media on the tick thread instead of worker threads.
    #[arg(long)]
    inline: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the frame stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref()).context("load preview config")?;
    if let Some(fps) = cli.fps {
        anyhow::ensure!(fps > 0, "fps must be positive");
        config.fps = Rational::new(fps, 1);
    }
    if cli.inline {
        config.media.load_mode = LoadMode::Inline;
    }

    let doc = load_document(&cli.timeline)
        .with_context(|| format!("load timeline '{}'", cli.timeline.display()))?;

    let media_root = cli.media_root.clone().unwrap_or_else(|| {
        cli.timeline
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let loader = Arc::new(FsLoader::new(media_root));
    let frame_step = config.fps.frame_duration();
    tracing::info!(canvas = %doc.timeline.canvas_or(config.canvas), "Canvas resolved");
    let mut engine = PreviewEngine::new(config, loader, Box::new(NullBackend));

    let end = cli.end.unwrap_or_else(|| doc.duration());
    anyhow::ensure!(end >= cli.start, "end ({end}) is before start ({})", cli.start);
    let mut clock = PlaybackClock::new(TimeCode::from_secs(end));
    clock.seek(TimeCode::from_secs(cli.start));

    // Paused ticks until the first loads land, so early frames are complete.
    let deadline = Instant::now() + WARMUP_TIMEOUT;
    while engine.tick(&doc, &clock.snapshot()).loading {
        if Instant::now() > deadline {
            tracing::warn!("Media still loading after warm-up, starting anyway");
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut frames = 0u64;
    if end > cli.start {
        clock.play();
    }
    loop {
        let snapshot = clock.snapshot();
        let tick = engine.tick(&doc, &snapshot);
        if tick.pause_requested {
            clock.force_pause();
        }

        let line = json!({
            "time": snapshot.secs(),
            "timecode": format_time(snapshot.secs()),
            "descriptors": tick.descriptors,
            "pending": tick.pending,
            "warnings": tick.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "audio_errors": tick.audio_errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        serde_json::to_writer(&mut out, &line).context("write frame")?;
        writeln!(out).context("write frame")?;
        frames += 1;

        if !clock.is_playing() {
            break;
        }
        clock.advance(frame_step);
    }
    out.flush().context("flush output")?;

    engine.shutdown();
    tracing::info!(frames, end = %format_time(end), "Preview finished");
    Ok(())
}
