//! 記録済みランドマークの再生と結果の書き出し（JSON Lines）。
//!
//! 入力1行 = 1フレーム:
//! `{"timestamp_ms": 0, "hand": [[x, y, z], ...], "face": [[x, y, z], ...]}`
//!
//! 複数の手・顔を記録した場合は予測ごとの配列を並べる
//! (`"hand": [[[x, y, z], ...], [[x, y, z], ...]]`)。出力順に連結される。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::warn;

use crate::alert::AlertEvent;
use crate::detector::DetectionResult;
use crate::landmark::ingest::{flatten_predictions, has_non_finite};
use crate::landmark::PointSet;
use crate::runner::{DetectionSink, LandmarkFrame, LandmarkSource};

/// 1つの点列、または予測ごとの点列の並び
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedLandmarks {
    Single(Vec<[f32; 3]>),
    Predictions(Vec<Vec<[f32; 3]>>),
}

impl Default for RecordedLandmarks {
    fn default() -> Self {
        RecordedLandmarks::Single(Vec::new())
    }
}

impl RecordedLandmarks {
    fn flatten(&self, mirror: bool) -> PointSet {
        match self {
            RecordedLandmarks::Single(points) => flatten_predictions(std::slice::from_ref(points), mirror),
            RecordedLandmarks::Predictions(predictions) => flatten_predictions(predictions, mirror),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    timestamp_ms: Option<u64>,
    #[serde(default)]
    hand: RecordedLandmarks,
    #[serde(default)]
    face: RecordedLandmarks,
}

pub struct ReplaySource<R> {
    reader: R,
    line_no: usize,
    mirror: bool,
    buf: String,
}

impl ReplaySource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, mirror: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open replay {}", path.display()))?;
        Ok(Self::new(BufReader::new(file), mirror))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// mirror: 推定器出力の符号反転（全座標）
    pub fn new(reader: R, mirror: bool) -> Self {
        Self {
            reader,
            line_no: 0,
            mirror,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> LandmarkSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        loop {
            self.buf.clear();
            let n = self
                .reader
                .read_line(&mut self.buf)
                .with_context(|| format!("Failed to read replay line {}", self.line_no + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let recorded: RecordedFrame = serde_json::from_str(line)
                .with_context(|| format!("Invalid frame at line {}", self.line_no))?;
            let frame = LandmarkFrame {
                timestamp_ms: recorded.timestamp_ms,
                hand: recorded.hand.flatten(self.mirror),
                face: recorded.face.flatten(self.mirror),
            };

            if has_non_finite(&frame.hand) || has_non_finite(&frame.face) {
                warn!("line {}: non-finite landmark, frame skipped", self.line_no);
                continue;
            }
            return Ok(Some(frame));
        }
    }
}

/// 結果を1行1 JSON で書き出す
pub struct JsonLinesSink<W: Write> {
    writer: W,
    detected_only: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            detected_only: false,
        }
    }

    /// 確定検出フレームだけ書く
    pub fn detected_only(mut self, enabled: bool) -> Self {
        self.detected_only = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DetectionSink for JsonLinesSink<W> {
    fn on_result(&mut self, result: &DetectionResult) -> Result<()> {
        if self.detected_only && !result.detection.is_detected {
            return Ok(());
        }
        serde_json::to_writer(&mut self.writer, result).context("Failed to encode result")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn on_alert(&mut self, event: &AlertEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &serde_json::json!({ "alert": event }))
            .context("Failed to encode alert")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
