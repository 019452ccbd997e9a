//! 推定器出力から PointSet への変換。
//!
//! 複数の顔・手の推定結果は出力順に連結する。連結後のインデックスが
//! 履歴キーや描画側の参照インデックスになる。

use super::point::{Point3D, PointSet};

/// 推定結果（予測ごとのランドマーク配列）を1つの PointSet に平坦化する
///
/// - mirror: true なら全座標の符号を反転する（自撮り映像の鏡像補正）
pub fn flatten_predictions<P: AsRef<[[f32; 3]]>>(predictions: &[P], mirror: bool) -> PointSet {
    let total: usize = predictions.iter().map(|p| p.as_ref().len()).sum();
    let mut points = Vec::with_capacity(total);
    for prediction in predictions {
        for raw in prediction.as_ref() {
            let p = Point3D::from(*raw);
            points.push(if mirror { p.mirrored() } else { p });
        }
    }
    points
}

/// 非有限値を含むランドマークがあるか
pub fn has_non_finite(points: &[Point3D]) -> bool {
    points.iter().any(|p| !p.is_finite())
}
