use super::{ProximityResult, ProximitySearch, ProximityStrategy};
use crate::geometry::Octree;
use crate::landmark::Point3D;

/// 顔点群の octree に対する半径探索
///
/// 半径内に候補がなければ OutOfRange を返す。全点走査へのフォールバックはしない。
/// radius が None の場合は半径無制限で問い合わせる。
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexed;

impl ProximityStrategy for Indexed {
    fn name(&self) -> &'static str {
        "indexed"
    }

    fn search(&self, hand: &[Point3D], face: &[Point3D], radius: Option<f32>) -> ProximitySearch {
        if hand.is_empty() || face.is_empty() {
            return ProximitySearch::NoPoints;
        }

        let tree = Octree::build(face);
        let radius = radius.unwrap_or(f32::INFINITY);
        let mut candidates = Vec::new();
        let mut best: Option<ProximityResult> = None;

        for hand_index in 0..hand.len() {
            candidates.clear();
            tree.query_radius(&hand[hand_index], radius, &mut candidates);
            for &face_index in &candidates {
                let candidate = ProximityResult::between(hand, face, hand_index, face_index);
                if best.map_or(true, |b| candidate.precedes(&b)) {
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some(b) => ProximitySearch::Found(b),
            None => ProximitySearch::OutOfRange,
        }
    }
}
