use super::{ProximityResult, ProximitySearch, ProximityStrategy};
use crate::landmark::Point3D;

/// 全ペアを走査する O(n·m) 探索
///
/// 手点インデックス優先で走査し、同距離なら先に見つかったペアを残す。
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl ProximityStrategy for BruteForce {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn search(&self, hand: &[Point3D], face: &[Point3D], radius: Option<f32>) -> ProximitySearch {
        if hand.is_empty() || face.is_empty() {
            return ProximitySearch::NoPoints;
        }

        let mut best: Option<ProximityResult> = None;
        for hand_index in 0..hand.len() {
            for face_index in 0..face.len() {
                let candidate = ProximityResult::between(hand, face, hand_index, face_index);
                if candidate.distance.is_nan() {
                    continue;
                }
                if best.map_or(true, |b| candidate.distance < b.distance) {
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some(b) if radius.map_or(true, |r| b.distance <= r) => ProximitySearch::Found(b),
            _ => ProximitySearch::OutOfRange,
        }
    }
}
