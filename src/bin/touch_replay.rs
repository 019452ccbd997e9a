//! 記録済みランドマーク（JSON Lines）を検出器に流して結果を書き出す。
//!
//! touch_replay --input session.jsonl --output results.jsonl --no-delay

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use facetouch::alert::AlertEvent;
use facetouch::replay::{JsonLinesSink, ReplaySource};
use facetouch::runner::{DetectionSink, FrameRunner};
use facetouch::{Config, DetectionResult};

#[derive(Parser, Debug)]
#[command(name = "touch_replay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 設定ファイル（TOML）
    #[arg(short, long, default_value = "facetouch.toml")]
    config: PathBuf,

    /// 入力フレーム（JSON Lines）
    #[arg(short, long)]
    input: PathBuf,

    /// 結果の出力先。省略時は標準出力。
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 確定検出フレームのみ出力
    #[arg(long)]
    detected_only: bool,

    /// フレーム間の待ちを入れない
    #[arg(long)]
    no_delay: bool,

    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Session log
// ---------------------------------------------------------------------------

fn open_log_file() -> Result<(BufWriter<File>, String)> {
    std::fs::create_dir_all("logs")?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = format!("logs/touch_{}.log", ts);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path))?;
    Ok((BufWriter::new(file), path))
}

macro_rules! log {
    ($logfile:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        let ts = chrono::Local::now().format("%H:%M:%S%.3f");
        let _ = writeln!($logfile, "[{}] {}", ts, msg);
    }};
}

/// 結果出力に加えて接触・通知をセッションログへ残す
struct SessionSink {
    out: JsonLinesSink<Box<dyn Write>>,
    logfile: BufWriter<File>,
}

impl DetectionSink for SessionSink {
    fn on_result(&mut self, result: &DetectionResult) -> Result<()> {
        if result.detection.is_new {
            if let Some(p) = &result.proximity {
                log!(
                    self.logfile,
                    "[touch] frame {} hand {} face {} distance {:.2} front={}",
                    result.frame, p.hand_index, p.face_index, p.distance, result.in_front_of_face
                );
            }
        }
        self.out.on_result(result)
    }

    fn on_alert(&mut self, event: &AlertEvent) -> Result<()> {
        log!(self.logfile, "[alert] #{} ({} frames)", event.total, event.count);
        self.out.on_alert(event)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load_or_default(&cli.config);
    let mirror = config.runner.mirror_input;

    let (mut logfile, log_path) = open_log_file()?;
    info!("session log: {}", log_path);
    log!(logfile, "touch_replay {}", env!("CARGO_PKG_VERSION"));
    log!(logfile, "input: {}", cli.input.display());
    log!(
        logfile,
        "thresholds front={} side={} window={} proximity={:?}",
        config.detector.front_threshold,
        config.detector.side_threshold,
        config.debounce.window_size,
        config.proximity.mode
    );

    let mut runner = FrameRunner::new(config)?;
    if cli.no_delay {
        runner = runner.with_frame_delay(Duration::ZERO);
    }

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut sink = SessionSink {
        out: JsonLinesSink::new(writer).detected_only(cli.detected_only),
        logfile,
    };
    let mut source = ReplaySource::open(&cli.input, mirror)?;

    let stats = runner.run(&mut source, &mut sink)?;

    let (_, face_heat) = runner.detector_mut().heat_maps(None);
    let hottest = runner.detector().history().hottest_face_index();
    log!(
        sink.logfile,
        "done: {} frames, {} detected, {} touches, {} alerts, {} face landmarks touched",
        stats.frames,
        stats.detected_frames,
        stats.touches,
        stats.alerts,
        face_heat.len()
    );
    if let Some((index, count)) = hottest {
        log!(sink.logfile, "most touched face landmark: {} ({} frames)", index, count);
    }

    sink.out.into_inner().flush()?;
    sink.logfile.flush()?;
    eprintln!(
        "{} frames, {} touches, {} alerts (log: {})",
        stats.frames, stats.touches, stats.alerts, log_path
    );
    Ok(())
}
