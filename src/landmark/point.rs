use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// 単一ランドマークの3D座標
///
/// シリアライズ時は `[x, y, z]` の配列として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 1フレーム分のランドマーク列。インデックスは推定器の出力順そのまま。
pub type PointSet = Vec<Point3D>;

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// self - other の差分ベクトル
    pub fn delta(&self, other: &Point3D) -> Vector3<f32> {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// ユークリッド距離
    pub fn distance(&self, other: &Point3D) -> f32 {
        self.delta(other).norm()
    }

    /// 全座標の符号を反転（鏡像）
    pub fn mirrored(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Point3D {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Point3D> for [f32; 3] {
    fn from(p: Point3D) -> Self {
        p.to_array()
    }
}

impl From<Vector3<f32>> for Point3D {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// X座標の平均。空なら None。
pub fn average_x(points: &[Point3D]) -> Option<f32> {
    if points.is_empty() {
        return None;
    }
    let sum: f32 = points.iter().map(|p| p.x).sum();
    Some(sum / points.len() as f32)
}
