use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::landmark::Point3D;

/// corners() 上の辺ポリライン（描画用）
pub const BOX_EDGES: [(&str, &[usize]); 6] = [
    ("top", &[0, 2, 6, 4, 0]),
    ("bottom", &[1, 3, 7, 5, 1]),
    ("column1", &[0, 1]),
    ("column2", &[2, 3]),
    ("column3", &[4, 5]),
    ("column4", &[6, 7]),
];

/// 軸平行バウンディングボックス
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl BoundingBox {
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32, z_min: f32, z_max: f32) -> Self {
        Self { x_min, x_max, y_min, y_max, z_min, z_max }
    }

    /// 点群からボックスを構築する。空なら None。
    ///
    /// margin はX軸のみ左右対称に加算する（顔ボックスを耳方向へ広げる用途）。
    pub fn from_points(points: &[Point3D], margin: f32) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = Self::new(first.x, first.x, first.y, first.y, first.z, first.z);
        for p in rest {
            b.x_min = b.x_min.min(p.x);
            b.x_max = b.x_max.max(p.x);
            b.y_min = b.y_min.min(p.y);
            b.y_max = b.y_max.max(p.y);
            b.z_min = b.z_min.min(p.z);
            b.z_max = b.z_max.max(p.z);
        }
        b.x_min -= margin;
        b.x_max += margin;
        Some(b)
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn depth(&self) -> f32 {
        self.z_max - self.z_min
    }

    pub fn volume(&self) -> f32 {
        self.width() * self.height() * self.depth()
    }

    pub fn center(&self) -> Point3D {
        Point3D::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
            (self.z_min + self.z_max) / 2.0,
        )
    }

    /// 8頂点。インデックスのビット2がx、ビット1がy、ビット0がz（0=min, 1=max）。
    pub fn corners(&self) -> [Point3D; 8] {
        std::array::from_fn(|i| {
            Point3D::new(
                if i & 0b100 == 0 { self.x_min } else { self.x_max },
                if i & 0b010 == 0 { self.y_min } else { self.y_max },
                if i & 0b001 == 0 { self.z_min } else { self.z_max },
            )
        })
    }

    /// 交差体積。いずれかの軸で重なりが負なら 0。
    pub fn intersection_volume(&self, other: &BoundingBox) -> f32 {
        let dx = self.x_max.min(other.x_max) - self.x_min.max(other.x_min);
        let dy = self.y_max.min(other.y_max) - self.y_min.max(other.y_min);
        let dz = self.z_max.min(other.z_max) - self.z_min.max(other.z_min);
        if dx < 0.0 || dy < 0.0 || dz < 0.0 {
            return 0.0;
        }
        dx * dy * dz
    }

    /// X範囲で other を完全に内包するか（両端とも厳密）
    pub fn contains_x_range(&self, other: &BoundingBox) -> bool {
        self.x_min < other.x_min && other.x_max < self.x_max
    }

    /// 点がボックス内（境界含む）にあるか
    pub fn contains(&self, p: &Point3D) -> bool {
        p.x >= self.x_min
            && p.x <= self.x_max
            && p.y >= self.y_min
            && p.y <= self.y_max
            && p.z >= self.z_min
            && p.z <= self.z_max
    }

    /// 点からボックスまでの最短距離（内部なら 0）
    pub fn distance_to(&self, p: &Point3D) -> f32 {
        let dx = (self.x_min - p.x).max(0.0).max(p.x - self.x_max);
        let dy = (self.y_min - p.y).max(0.0).max(p.y - self.y_max);
        let dz = (self.z_min - p.z).max(0.0).max(p.z - self.z_max);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// 中心間の差分 (self - other) と距離
    pub fn center_delta(&self, other: &BoundingBox) -> (Vector3<f32>, f32) {
        let d = self.center().delta(&other.center());
        (d, d.norm())
    }
}

/// Option 同士の交差体積。どちらかが None なら 0。
pub fn intersection_volume(a: Option<&BoundingBox>, b: Option<&BoundingBox>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => a.intersection_volume(b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(min: f32, max: f32) -> BoundingBox {
        BoundingBox::new(min, max, min, max, min, max)
    }

    #[test]
    fn test_from_points_empty() {
        assert!(BoundingBox::from_points(&[], 0.0).is_none());
        assert!(BoundingBox::from_points(&[], 10.0).is_none());
    }

    #[test]
    fn test_from_points_min_le_max() {
        let points = vec![
            Point3D::new(3.0, -1.0, 2.0),
            Point3D::new(-2.0, 4.0, 0.5),
            Point3D::new(0.0, 0.0, -7.0),
        ];
        let b = BoundingBox::from_points(&points, 0.0).unwrap();
        assert!(b.x_min <= b.x_max && b.y_min <= b.y_max && b.z_min <= b.z_max);
        assert_eq!(b, BoundingBox::new(-2.0, 3.0, -1.0, 4.0, -7.0, 2.0));
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let b = BoundingBox::from_points(&[Point3D::new(1.0, 2.0, 3.0)], 0.0).unwrap();
        assert_eq!(b.volume(), 0.0);
        assert_eq!(b.center(), Point3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_margin_x_only() {
        let points = vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(2.0, 2.0, 2.0)];
        let b = BoundingBox::from_points(&points, 10.0).unwrap();
        assert_eq!(b.x_min, -10.0);
        assert_eq!(b.x_max, 12.0);
        assert_eq!((b.y_min, b.y_max), (0.0, 2.0));
        assert_eq!((b.z_min, b.z_max), (0.0, 2.0));
    }

    #[test]
    fn test_intersection_overlap() {
        let a = cube(0.0, 2.0);
        let b = cube(1.0, 3.0);
        assert!((a.intersection_volume(&b) - 1.0).abs() < 1e-6);
        assert_eq!(a.intersection_volume(&b), b.intersection_volume(&a));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = cube(0.0, 1.0);
        let b = BoundingBox::new(0.0, 1.0, 0.0, 1.0, 5.0, 6.0);
        assert_eq!(a.intersection_volume(&b), 0.0);
        assert_eq!(b.intersection_volume(&a), 0.0);
    }

    #[test]
    fn test_intersection_symmetric_grid() {
        let boxes = [
            cube(0.0, 2.0),
            cube(1.0, 3.0),
            BoundingBox::new(-1.0, 0.5, 0.0, 4.0, 1.0, 1.5),
            BoundingBox::new(10.0, 11.0, 0.0, 1.0, 0.0, 1.0),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersection_volume(b), b.intersection_volume(a));
            }
        }
    }

    #[test]
    fn test_intersection_optional() {
        let a = cube(0.0, 2.0);
        assert_eq!(intersection_volume(None, Some(&a)), 0.0);
        assert_eq!(intersection_volume(Some(&a), None), 0.0);
        assert_eq!(intersection_volume(None, None), 0.0);
        assert_eq!(intersection_volume(Some(&a), Some(&a)), 8.0);
    }

    #[test]
    fn test_center() {
        let b = BoundingBox::new(0.0, 4.0, -2.0, 2.0, 1.0, 3.0);
        assert_eq!(b.center(), Point3D::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn test_corners_order_stable() {
        let b = BoundingBox::new(0.0, 1.0, 2.0, 3.0, 4.0, 5.0);
        let c = b.corners();
        assert_eq!(c[0], Point3D::new(0.0, 2.0, 4.0));
        assert_eq!(c[1], Point3D::new(0.0, 2.0, 5.0));
        assert_eq!(c[2], Point3D::new(0.0, 3.0, 4.0));
        assert_eq!(c[3], Point3D::new(0.0, 3.0, 5.0));
        assert_eq!(c[4], Point3D::new(1.0, 2.0, 4.0));
        assert_eq!(c[7], Point3D::new(1.0, 3.0, 5.0));
        assert_eq!(c, b.corners());
    }

    #[test]
    fn test_box_edges_reference_valid_corners() {
        for (_, edge) in BOX_EDGES.iter() {
            assert!(edge.iter().all(|&i| i < 8));
        }
    }

    #[test]
    fn test_distance_to() {
        let b = cube(0.0, 1.0);
        assert_eq!(b.distance_to(&Point3D::new(0.5, 0.5, 0.5)), 0.0);
        assert!((b.distance_to(&Point3D::new(4.0, 5.0, 0.5)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_contains_x_range() {
        let face = BoundingBox::new(0.0, 10.0, 0.0, 1.0, 0.0, 1.0);
        let inner = BoundingBox::new(2.0, 8.0, 5.0, 6.0, 5.0, 6.0);
        let edge = BoundingBox::new(0.0, 8.0, 0.0, 1.0, 0.0, 1.0);
        assert!(face.contains_x_range(&inner));
        assert!(!face.contains_x_range(&edge));
    }

    #[test]
    fn test_center_delta() {
        let a = cube(0.0, 2.0);
        let b = BoundingBox::new(3.0, 5.0, 4.0, 6.0, 0.0, 2.0);
        let (d, len) = b.center_delta(&a);
        assert_eq!(d, Vector3::new(3.0, 4.0, 0.0));
        assert!((len - 5.0).abs() < 1e-6);
    }
}
