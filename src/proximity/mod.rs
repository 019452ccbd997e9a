//! 手点群と顔点群の最近点ペア探索。
//!
//! 総当たり (`BruteForce`) と octree による半径探索 (`Indexed`) の2実装を
//! `ProximityStrategy` の背後に置き、設定で切り替える。両者は有限な入力に
//! 対して同じ距離・同じインデックスペアを返す。

pub mod brute;
pub mod indexed;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::{ProximityConfig, ProximityMode};
use crate::landmark::Point3D;

pub use brute::BruteForce;
pub use indexed::Indexed;

/// 最近点ペア
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    /// hand - face の差分
    pub delta: Vector3<f32>,
    pub distance: f32,
    pub hand_index: usize,
    pub face_index: usize,
}

impl ProximityResult {
    pub(crate) fn between(hand: &[Point3D], face: &[Point3D], hand_index: usize, face_index: usize) -> Self {
        let delta = hand[hand_index].delta(&face[face_index]);
        Self {
            delta,
            distance: delta.norm(),
            hand_index,
            face_index,
        }
    }

    /// 走査順の比較で self より先に採用されるべきか
    pub(crate) fn precedes(&self, other: &ProximityResult) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance
                && (self.hand_index, self.face_index) < (other.hand_index, other.face_index))
    }
}

/// 探索結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProximitySearch {
    /// どちらかの点群が空
    NoPoints,
    /// 点はあるが半径内にペアがない
    OutOfRange,
    Found(ProximityResult),
}

impl ProximitySearch {
    pub fn result(&self) -> Option<&ProximityResult> {
        match self {
            ProximitySearch::Found(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<ProximityResult> {
        match self {
            ProximitySearch::Found(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ProximitySearch::Found(_))
    }
}

pub trait ProximityStrategy {
    fn name(&self) -> &'static str;

    /// radius: Some(r) なら距離 r 以内のペアのみ対象
    fn search(&self, hand: &[Point3D], face: &[Point3D], radius: Option<f32>) -> ProximitySearch;

    fn nearest(&self, hand: &[Point3D], face: &[Point3D], radius: Option<f32>) -> Option<ProximityResult> {
        self.search(hand, face, radius).into_result()
    }
}

/// 設定から探索戦略を生成
pub fn strategy_from_config(config: &ProximityConfig) -> Box<dyn ProximityStrategy> {
    match config.mode {
        ProximityMode::BruteForce => Box::new(BruteForce),
        ProximityMode::Indexed => Box::new(Indexed),
    }
}
