use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub depth: DepthConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// 手が顔の前にあるかの判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontPolicy {
    /// 手点X座標の平均が顔ボックスのX範囲内（厳密）
    #[default]
    HandAverage,
    /// 手ボックスのX範囲が顔ボックスのX範囲に内包される
    BoxContainment,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// 顔ボックスのX方向マージン
    #[serde(default = "default_face_margin")]
    pub face_margin: f32,
    /// 顔の前にある場合の距離閾値
    #[serde(default = "default_front_threshold")]
    pub front_threshold: f32,
    /// 顔の横にある場合の距離閾値
    #[serde(default = "default_side_threshold")]
    pub side_threshold: f32,
    #[serde(default)]
    pub front_policy: FrontPolicy,
    /// true なら手・顔ボックスが交差しているフレームのみ判定する
    #[serde(default)]
    pub require_intersection: bool,
}

fn default_face_margin() -> f32 { 10.0 }
fn default_front_threshold() -> f32 { 10.0 }
fn default_side_threshold() -> f32 { 30.0 }

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            face_margin: default_face_margin(),
            front_threshold: default_front_threshold(),
            side_threshold: default_side_threshold(),
            front_policy: FrontPolicy::default(),
            require_intersection: false,
        }
    }
}

/// 顔の前にある手のZ補正
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DepthConfig {
    #[serde(default = "default_depth_enabled")]
    pub enabled: bool,
    /// Z補正の最大量
    #[serde(default = "default_depth_boost")]
    pub boost: f32,
    /// atan の傾き
    #[serde(default = "default_depth_steepness")]
    pub steepness: f32,
    /// atan の中心オフセット
    #[serde(default = "default_depth_offset")]
    pub offset: f32,
}

fn default_depth_enabled() -> bool { true }
fn default_depth_boost() -> f32 { 35.0 }
fn default_depth_steepness() -> f32 { 32.0 }
fn default_depth_offset() -> f32 { 25.0 }

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            enabled: default_depth_enabled(),
            boost: default_depth_boost(),
            steepness: default_depth_steepness(),
            offset: default_depth_offset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityMode {
    #[default]
    BruteForce,
    Indexed,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ProximityConfig {
    #[serde(default)]
    pub mode: ProximityMode,
    /// 探索半径。None なら無制限。
    #[serde(default)]
    pub radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DebounceConfig {
    /// 連続何フレームの検出で確定とするか
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize { 2 }

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { window_size: default_window_size() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// 履歴の保持期間（秒）
    #[serde(default = "default_retention_secs")]
    pub retention_secs: f64,
}

fn default_retention_secs() -> f64 { 60.0 * 60.0 }

impl HistoryConfig {
    /// validate() 済みであること
    pub fn retention(&self) -> Duration {
        Duration::try_from_secs_f64(self.retention_secs).unwrap_or(Duration::ZERO)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { retention_secs: default_retention_secs() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AlertConfig {
    /// 集計間隔（ミリ秒）
    #[serde(default = "default_alert_interval_ms")]
    pub interval_ms: u64,
    /// 1間隔あたりのアラート発火に必要な確定検出数
    #[serde(default = "default_alert_min_count")]
    pub min_count: u32,
}

fn default_alert_interval_ms() -> u64 { 1000 }
fn default_alert_min_count() -> u32 { 2 }

impl AlertConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_alert_interval_ms(),
            min_count: default_alert_min_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// フレーム間の待ち時間（ミリ秒、0で待たない）
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    /// 入力ランドマークの全座標を符号反転する
    #[serde(default)]
    pub mirror_input: bool,
}

fn default_frame_delay_ms() -> u64 { 300 }

impl RunnerConfig {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_delay_ms: default_frame_delay_ms(),
            mirror_input: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("{} not found, using default config", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detector;
        ConfigError::check_non_negative("detector.face_margin", d.face_margin as f64)?;
        ConfigError::check_positive("detector.front_threshold", d.front_threshold as f64)?;
        ConfigError::check_positive("detector.side_threshold", d.side_threshold as f64)?;

        let z = &self.depth;
        ConfigError::check_non_negative("depth.boost", z.boost as f64)?;
        ConfigError::check_positive("depth.steepness", z.steepness as f64)?;
        ConfigError::check_non_negative("depth.offset", z.offset as f64)?;

        if let Some(r) = self.proximity.radius {
            ConfigError::check_positive("proximity.radius", r as f64)?;
        }
        if self.debounce.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        ConfigError::check_non_negative("history.retention_secs", self.history.retention_secs)?;
        if Duration::try_from_secs_f64(self.history.retention_secs).is_err() {
            return Err(ConfigError::OutOfRange {
                name: "history.retention_secs",
                value: self.history.retention_secs,
            });
        }
        ConfigError::check_positive("alert.interval_ms", self.alert.interval_ms as f64)?;
        ConfigError::check_positive("alert.min_count", self.alert.min_count as f64)?;
        Ok(())
    }
}
