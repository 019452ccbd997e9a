use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::detection::{
    DebounceState, Detection, DetectionClassifier, DetectionDebouncer, DetectionHistory, HeatMap,
    ZAxisCalibrator,
};
use crate::error::ConfigError;
use crate::geometry::{intersection_volume, BoundingBox};
use crate::landmark::{Point3D, PointSet};
use crate::proximity::{strategy_from_config, ProximityResult, ProximitySearch, ProximityStrategy};

/// 最近点探索の結果区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// 手か顔の点群が空
    NoPoints,
    /// 手・顔ボックスが交差せず探索しなかった（require_intersection）
    Gated,
    /// 探索半径内にペアがない
    OutOfRange,
    Found,
}

impl From<&ProximitySearch> for SearchOutcome {
    fn from(search: &ProximitySearch) -> Self {
        match search {
            ProximitySearch::NoPoints => SearchOutcome::NoPoints,
            ProximitySearch::OutOfRange => SearchOutcome::OutOfRange,
            ProximitySearch::Found(_) => SearchOutcome::Found,
        }
    }
}

/// 1フレーム分の判定結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub frame: u64,
    /// Z補正後の手点群
    pub hand_points: PointSet,
    pub face_points: PointSet,
    pub hand_box: Option<BoundingBox>,
    pub face_box: Option<BoundingBox>,
    pub intersection_volume: f32,
    /// ボックス中心間の距離
    pub center_distance: Option<f32>,
    pub search: SearchOutcome,
    /// search == Found のときのみ Some
    pub proximity: Option<ProximityResult>,
    pub in_front_of_face: bool,
    /// デバウンス前の生判定
    pub raw_touch: bool,
    pub detection: Detection,
}

/// 手と顔のランドマークから顔タッチを判定するエンジン
///
/// 状態（デバウンスバッファ・履歴・フレーム数）はすべてこの構造体が持つ。
pub struct TouchDetector {
    config: Config,
    calibrator: ZAxisCalibrator,
    classifier: DetectionClassifier,
    strategy: Box<dyn ProximityStrategy>,
    debouncer: DetectionDebouncer,
    history: DetectionHistory,
    frame_count: u64,
    last_state: DebounceState,
}

impl TouchDetector {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            calibrator: ZAxisCalibrator::from_config(&config),
            classifier: DetectionClassifier::from_config(&config.detector),
            strategy: strategy_from_config(&config.proximity),
            debouncer: DetectionDebouncer::new(config.debounce.window_size)?,
            history: DetectionHistory::new(config.history.retention()),
            frame_count: 0,
            last_state: DebounceState::Idle,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn state(&self) -> DebounceState {
        self.last_state
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    pub fn process(&mut self, hand: &[Point3D], face: &[Point3D]) -> DetectionResult {
        self.process_at(Instant::now(), hand, face)
    }

    pub fn process_at(&mut self, now: Instant, hand: &[Point3D], face: &[Point3D]) -> DetectionResult {
        self.frame_count += 1;

        let face_box = BoundingBox::from_points(face, self.config.detector.face_margin);
        let recal = self.calibrator.recalibrate(hand, face_box.as_ref());
        let hand_box = BoundingBox::from_points(&recal.points, 0.0);
        let volume = intersection_volume(hand_box.as_ref(), face_box.as_ref());

        let gated = self.config.detector.require_intersection
            && volume <= 0.0
            && !recal.points.is_empty()
            && !face.is_empty();
        let (outcome, proximity) = if gated {
            (SearchOutcome::Gated, None)
        } else {
            let search = self.strategy.search(&recal.points, face, self.config.proximity.radius);
            (SearchOutcome::from(&search), search.into_result())
        };

        let raw_touch = self.classifier.classify(proximity.as_ref(), recal.in_front_of_face);
        let detection = self.debouncer.update(raw_touch);

        if detection.is_detected {
            if let Some(p) = &proximity {
                self.history.push_at(now, p.hand_index, p.face_index, detection.is_new);
            }
        }
        if detection.is_new {
            if let Some(p) = &proximity {
                info!(
                    "frame {}: touch started (hand {} / face {}, distance {:.2}, front={})",
                    self.frame_count, p.hand_index, p.face_index, p.distance, recal.in_front_of_face
                );
            }
        }

        let state = self.debouncer.state();
        if state != self.last_state {
            debug!("frame {}: {:?} -> {:?}", self.frame_count, self.last_state, state);
            self.last_state = state;
        }

        let center_distance = match (&hand_box, &face_box) {
            (Some(h), Some(f)) => Some(h.center_delta(f).1),
            _ => None,
        };

        DetectionResult {
            frame: self.frame_count,
            hand_points: recal.points,
            face_points: face.to_vec(),
            hand_box,
            face_box,
            intersection_volume: volume,
            center_distance,
            search: outcome,
            proximity,
            in_front_of_face: recal.in_front_of_face,
            raw_touch,
            detection,
        }
    }

    /// 実行中に設定を差し替える。検証に失敗した場合は現在の設定を維持する。
    pub fn update(&mut self, config: Config) -> Result<(), ConfigError> {
        self.update_at(Instant::now(), config)
    }

    pub fn update_at(&mut self, now: Instant, config: Config) -> Result<(), ConfigError> {
        config.validate()?;

        if config.debounce.window_size != self.config.debounce.window_size {
            debug!(
                "debounce window {} -> {}",
                self.config.debounce.window_size, config.debounce.window_size
            );
            self.debouncer.resize(config.debounce.window_size)?;
            self.last_state = self.debouncer.state();
        }
        if config.history.retention() != self.history.retention() {
            self.history.change_retention_at(now, config.history.retention());
        }
        if config.proximity.mode != self.config.proximity.mode {
            self.strategy = strategy_from_config(&config.proximity);
        }
        self.calibrator = ZAxisCalibrator::from_config(&config);
        self.classifier = DetectionClassifier::from_config(&config.detector);
        self.config = config;
        Ok(())
    }

    /// (手, 顔) ヒートマップ
    pub fn heat_maps(&mut self, filter_is_new: Option<bool>) -> (HeatMap, HeatMap) {
        self.history.heat_map(filter_is_new)
    }

    pub fn heat_maps_at(&mut self, now: Instant, filter_is_new: Option<bool>) -> (HeatMap, HeatMap) {
        self.history.heat_map_at(now, filter_is_new)
    }

    /// デバウンスと履歴を初期状態に戻す
    pub fn reset(&mut self) {
        self.debouncer.reset();
        self.history.clear();
        self.frame_count = 0;
        self.last_state = DebounceState::Idle;
    }
}
