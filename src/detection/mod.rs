//! フレーム単位の接触判定パイプラインの各段。
//!
//! Z補正 → 閾値判定 → デバウンス → 履歴 の順に [`crate::detector::TouchDetector`]
//! から呼ばれる。各段は単体でも使える。

pub mod calibrate;
pub mod classify;
pub mod debounce;
pub mod heatmap;
pub mod history;

pub use calibrate::{Recalibration, ZAxisCalibrator};
pub use classify::DetectionClassifier;
pub use debounce::{DebounceState, Detection, DetectionDebouncer};
pub use heatmap::{CountMap, HeatMap, HeatPalette};
pub use history::{DetectionHistory, HistoryEntry};
