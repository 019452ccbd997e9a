//! 手と顔の3Dランドマークから「顔に触れたか」を判定するエンジン。
//!
//! 1フレームごとに [`detector::TouchDetector::process`] へ手点群と顔点群を渡すと、
//! ボックス・最近点ペア・デバウンス済みの判定を [`detector::DetectionResult`] で返す。
//! 確定した接触は保持期間つきの履歴に積まれ、ランドマークごとのヒートマップになる。

pub mod alert;
pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod landmark;
pub mod proximity;
pub mod replay;
pub mod runner;

pub use config::Config;
pub use detector::{DetectionResult, SearchOutcome, TouchDetector};
pub use error::ConfigError;
pub use landmark::Point3D;
