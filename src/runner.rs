//! フレーム供給元から検出器を回すループ。
//!
//! 供給元 ([`LandmarkSource`]) と出力先 ([`DetectionSink`]) はトレイトで
//! 差し替える。停止は `Arc<AtomicBool>` を下ろして協調的に行う。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::alert::{AlertEvent, TouchAlert};
use crate::config::Config;
use crate::detector::{DetectionResult, TouchDetector};
use crate::landmark::PointSet;

/// 1フレーム分のランドマーク
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LandmarkFrame {
    /// 記録時刻（ミリ秒）。あればこれを検出器の時刻として使う。
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub hand: PointSet,
    #[serde(default)]
    pub face: PointSet,
}

pub trait LandmarkSource {
    /// None で終端
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

impl LandmarkSource for VecDeque<LandmarkFrame> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        Ok(self.pop_front())
    }
}

pub trait DetectionSink {
    fn on_result(&mut self, result: &DetectionResult) -> Result<()>;

    /// 確定検出のフレームごとに呼ばれる
    fn on_detected(&mut self, _result: &DetectionResult) -> Result<()> {
        Ok(())
    }

    fn on_alert(&mut self, _event: &AlertEvent) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub frames: u64,
    pub detected_frames: u64,
    pub touches: u64,
    pub alerts: u32,
}

pub struct FrameRunner {
    detector: TouchDetector,
    alert: TouchAlert,
    frame_delay: Duration,
    running: Arc<AtomicBool>,
}

impl FrameRunner {
    pub fn new(config: Config) -> Result<Self> {
        let alert = TouchAlert::from_config(&config.alert);
        let frame_delay = config.runner.frame_delay();
        let detector = TouchDetector::new(config).context("Invalid detector config")?;
        Ok(Self {
            detector,
            alert,
            frame_delay,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// 待ち時間を上書き（0 で待たない）
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    /// 別スレッドから false にするとループが止まる
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn detector(&self) -> &TouchDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut TouchDetector {
        &mut self.detector
    }

    /// 実行中のパラメータ変更。検証に失敗したら何も変えない。
    pub fn update(&mut self, config: Config) -> Result<()> {
        let alert = config.alert.clone();
        let delay = config.runner.frame_delay();
        self.detector.update(config).context("Rejected config update")?;
        self.alert.reconfigure(&alert);
        self.frame_delay = delay;
        Ok(())
    }

    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunStats>
    where
        S: LandmarkSource + ?Sized,
        K: DetectionSink + ?Sized,
    {
        let mut stats = RunStats::default();
        let started = Instant::now();
        let mut clock = started;

        info!("detector started ({})", self.detector.strategy_name());
        while self.running.load(Ordering::Relaxed) {
            let tick = Instant::now();
            let Some(frame) = source.next_frame()? else {
                debug!("source exhausted");
                break;
            };

            // 記録時刻があればそれを使う。時刻は単調非減少に保つ。
            let now = match frame.timestamp_ms {
                Some(ms) => started + Duration::from_millis(ms),
                None => tick,
            };
            clock = clock.max(now);

            let result = self.detector.process_at(clock, &frame.hand, &frame.face);
            stats.frames += 1;
            sink.on_result(&result)?;

            if result.detection.is_detected {
                stats.detected_frames += 1;
                sink.on_detected(&result)?;
            }
            if result.detection.is_new {
                stats.touches += 1;
            }
            if let Some(event) = self.alert.observe_at(clock, result.detection.is_detected) {
                stats.alerts += 1;
                sink.on_alert(&event)?;
            }

            let elapsed = tick.elapsed();
            if elapsed < self.frame_delay {
                std::thread::sleep(self.frame_delay - elapsed);
            }
        }
        info!(
            "detector stopped: {} frames, {} touches, {} alerts",
            stats.frames, stats.touches, stats.alerts
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Point3D;

    #[derive(Default)]
    struct Recorder {
        results: Vec<DetectionResult>,
        detected: usize,
        alerts: Vec<AlertEvent>,
    }

    impl DetectionSink for Recorder {
        fn on_result(&mut self, result: &DetectionResult) -> Result<()> {
            self.results.push(result.clone());
            Ok(())
        }

        fn on_detected(&mut self, _result: &DetectionResult) -> Result<()> {
            self.detected += 1;
            Ok(())
        }

        fn on_alert(&mut self, event: &AlertEvent) -> Result<()> {
            self.alerts.push(*event);
            Ok(())
        }
    }

    fn face() -> PointSet {
        (0..5)
            .flat_map(|i| (0..5).map(move |j| Point3D::new(i as f32 * 25.0, j as f32 * 25.0, 0.0)))
            .collect()
    }

    fn frame(ms: u64, touching: bool) -> LandmarkFrame {
        let hand = if touching {
            vec![Point3D::new(115.0, 50.0, 0.0)]
        } else {
            vec![Point3D::new(500.0, 500.0, 0.0)]
        };
        LandmarkFrame {
            timestamp_ms: Some(ms),
            hand,
            face: face(),
        }
    }

    fn runner() -> FrameRunner {
        FrameRunner::new(Config::default()).unwrap().with_frame_delay(Duration::ZERO)
    }

    #[test]
    fn test_runs_until_exhausted() {
        let mut source: VecDeque<_> = (0..4).map(|i| frame(i * 100, false)).collect();
        let mut sink = Recorder::default();
        let stats = runner().run(&mut source, &mut sink).unwrap();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.touches, 0);
        assert_eq!(sink.results.len(), 4);
        assert_eq!(sink.results[3].frame, 4);
    }

    #[test]
    fn test_detected_and_alert() {
        // 300ms 間隔で 5 フレーム接触 → 1000ms 時点で集計
        let mut source: VecDeque<_> = (0..5).map(|i| frame(i * 300, true)).collect();
        let mut sink = Recorder::default();
        let stats = runner().run(&mut source, &mut sink).unwrap();
        assert_eq!(stats.touches, 1);
        assert_eq!(stats.detected_frames, 4);
        assert_eq!(sink.detected, 4);
        assert_eq!(stats.alerts, 1);
        assert_eq!(sink.alerts[0].total, 1);
    }

    #[test]
    fn test_stop_flag() {
        let mut source: VecDeque<_> = (0..10).map(|i| frame(i, false)).collect();
        let mut sink = Recorder::default();
        let mut r = runner();
        r.running().store(false, Ordering::Relaxed);
        let stats = r.run(&mut source, &mut sink).unwrap();
        assert_eq!(stats.frames, 0);
        assert_eq!(source.len(), 10);
    }

    #[test]
    fn test_rejected_update() {
        let mut r = runner();
        let mut bad = Config::default();
        bad.debounce.window_size = 0;
        assert!(r.update(bad).is_err());
        assert_eq!(r.detector().config(), &Config::default());
    }

    #[test]
    fn test_frame_defaults() {
        let f: LandmarkFrame = serde_json::from_str(r#"{"hand": [[1, 2, 3]]}"#).unwrap();
        assert_eq!(f.timestamp_ms, None);
        assert_eq!(f.hand, vec![Point3D::new(1.0, 2.0, 3.0)]);
        assert!(f.face.is_empty());
    }
}
