use crate::config::{Config, DepthConfig, FrontPolicy};
use crate::geometry::BoundingBox;
use crate::landmark::{average_x, Point3D, PointSet};

/// Z補正の結果
#[derive(Debug, Clone, PartialEq)]
pub struct Recalibration {
    pub points: PointSet,
    pub in_front_of_face: bool,
}

impl Recalibration {
    fn unchanged(hand: &[Point3D]) -> Self {
        Self {
            points: hand.to_vec(),
            in_front_of_face: false,
        }
    }
}

/// 顔の前にある手のZ座標を補正する
///
/// 単眼推定では顔の前の手の奥行きが顔から離れて出るため、手の平均Xが
/// 顔の中心に近いほど大きくZを加算する。加算量は atan による飽和関数で
/// (0, 1) に収まり、boost 倍される。
#[derive(Debug, Clone)]
pub struct ZAxisCalibrator {
    enabled: bool,
    boost: f32,
    steepness: f32,
    offset: f32,
    policy: FrontPolicy,
}

impl ZAxisCalibrator {
    pub fn new(depth: &DepthConfig, policy: FrontPolicy) -> Self {
        Self {
            enabled: depth.enabled,
            boost: depth.boost,
            steepness: depth.steepness,
            offset: depth.offset,
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.depth, config.detector.front_policy)
    }

    pub fn policy(&self) -> FrontPolicy {
        self.policy
    }

    /// closeness: 顔中心で 1、顔の端で 0
    pub fn scale_factor(&self, closeness: f32) -> f32 {
        ((closeness * self.steepness - self.offset).atan() / std::f32::consts::FRAC_PI_2 + 1.0) / 2.0
    }

    /// 手と顔ボックスの水平位置関係から顔の前かを判定
    fn is_in_front(&self, hand: &[Point3D], avg_x: f32, face_box: &BoundingBox) -> bool {
        match self.policy {
            FrontPolicy::HandAverage => avg_x > face_box.x_min && avg_x < face_box.x_max,
            FrontPolicy::BoxContainment => BoundingBox::from_points(hand, 0.0)
                .map_or(false, |hand_box| face_box.contains_x_range(&hand_box)),
        }
    }

    pub fn recalibrate(&self, hand: &[Point3D], face_box: Option<&BoundingBox>) -> Recalibration {
        let (Some(face_box), Some(avg_x)) = (face_box, average_x(hand)) else {
            return Recalibration::unchanged(hand);
        };

        let half_width = face_box.width() / 2.0;
        if !(half_width.is_finite() && half_width > 0.0) || !avg_x.is_finite() {
            return Recalibration::unchanged(hand);
        }

        if !self.is_in_front(hand, avg_x, face_box) {
            return Recalibration::unchanged(hand);
        }

        let mut points = hand.to_vec();
        if self.enabled {
            let center_x = face_box.x_min + half_width;
            let closeness = (half_width - (avg_x - center_x).abs()) / half_width;
            let dz = self.boost * self.scale_factor(closeness);
            for p in &mut points {
                p.z += dz;
            }
        }

        Recalibration {
            points,
            in_front_of_face: true,
        }
    }
}

impl Default for ZAxisCalibrator {
    fn default() -> Self {
        Self::new(&DepthConfig::default(), FrontPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_box() -> BoundingBox {
        BoundingBox::new(0.0, 100.0, 0.0, 100.0, 0.0, 50.0)
    }

    fn hand_at(x: f32) -> Vec<Point3D> {
        vec![Point3D::new(x - 1.0, 10.0, 5.0), Point3D::new(x + 1.0, 20.0, 7.0)]
    }

    #[test]
    fn test_noop_without_face() {
        let c = ZAxisCalibrator::default();
        let hand = hand_at(50.0);
        let r = c.recalibrate(&hand, None);
        assert_eq!(r.points, hand);
        assert!(!r.in_front_of_face);
    }

    #[test]
    fn test_noop_without_hand() {
        let c = ZAxisCalibrator::default();
        let r = c.recalibrate(&[], Some(&face_box()));
        assert!(r.points.is_empty());
        assert!(!r.in_front_of_face);
    }

    #[test]
    fn test_zero_width_face_is_noop() {
        let c = ZAxisCalibrator::default();
        let flat = BoundingBox::new(50.0, 50.0, 0.0, 1.0, 0.0, 1.0);
        let hand = hand_at(50.0);
        let r = c.recalibrate(&hand, Some(&flat));
        assert_eq!(r.points, hand);
        assert!(!r.in_front_of_face);
        assert!(r.points.iter().all(|p| p.z.is_finite()));
    }

    #[test]
    fn test_side_hand_unchanged() {
        let c = ZAxisCalibrator::default();
        let hand = hand_at(150.0);
        let r = c.recalibrate(&hand, Some(&face_box()));
        assert_eq!(r.points, hand);
        assert!(!r.in_front_of_face);
    }

    #[test]
    fn test_boundary_is_not_in_front() {
        let c = ZAxisCalibrator::default();
        // 平均X = 100.0 = x_max（厳密な内側ではない）
        let hand = hand_at(100.0);
        assert!(!c.recalibrate(&hand, Some(&face_box())).in_front_of_face);
    }

    #[test]
    fn test_center_hand_boosted_near_max() {
        let c = ZAxisCalibrator::default();
        let hand = hand_at(50.0);
        let r = c.recalibrate(&hand, Some(&face_box()));
        assert!(r.in_front_of_face);
        let dz = r.points[0].z - hand[0].z;
        // atan(7) 付近: (atan(7)/(pi/2)+1)/2 ≈ 0.955
        assert!(dz > 30.0 && dz < 35.0, "dz={}", dz);
        assert!((r.points[1].z - hand[1].z - dz).abs() < 1e-4);
        // X, Y は変えない
        assert_eq!(r.points[0].x, hand[0].x);
        assert_eq!(r.points[1].y, hand[1].y);
    }

    #[test]
    fn test_boost_grows_toward_center() {
        let c = ZAxisCalibrator::default();
        let mut prev = -1.0;
        for x in [95.0, 90.0, 80.0, 70.0, 60.0, 50.0] {
            let hand = hand_at(x);
            let r = c.recalibrate(&hand, Some(&face_box()));
            let dz = r.points[0].z - hand[0].z;
            assert!(dz > prev, "x={} dz={} prev={}", x, dz, prev);
            assert!(dz > 0.0 && dz < 35.0);
            prev = dz;
        }
    }

    #[test]
    fn test_scale_factor_bounds() {
        let c = ZAxisCalibrator::default();
        for i in 0..=10 {
            let s = c.scale_factor(i as f32 / 10.0);
            assert!(s > 0.0 && s < 1.0);
        }
    }

    #[test]
    fn test_disabled_still_reports_front() {
        let depth = DepthConfig { enabled: false, ..DepthConfig::default() };
        let c = ZAxisCalibrator::new(&depth, FrontPolicy::HandAverage);
        let hand = hand_at(50.0);
        let r = c.recalibrate(&hand, Some(&face_box()));
        assert!(r.in_front_of_face);
        assert_eq!(r.points, hand);
    }

    #[test]
    fn test_box_containment_policy() {
        let c = ZAxisCalibrator::new(&DepthConfig::default(), FrontPolicy::BoxContainment);
        // 平均は内側だが手ボックスが顔の端をはみ出す
        let hand = vec![Point3D::new(-10.0, 0.0, 0.0), Point3D::new(60.0, 0.0, 0.0)];
        let r = c.recalibrate(&hand, Some(&face_box()));
        assert!(!r.in_front_of_face);

        let avg = ZAxisCalibrator::default();
        assert!(avg.recalibrate(&hand, Some(&face_box())).in_front_of_face);

        let inner = hand_at(40.0);
        assert!(c.recalibrate(&inner, Some(&face_box())).in_front_of_face);
    }

    #[test]
    fn test_input_not_mutated() {
        let c = ZAxisCalibrator::default();
        let hand = hand_at(50.0);
        let before = hand.clone();
        let _ = c.recalibrate(&hand, Some(&face_box()));
        assert_eq!(hand, before);
    }
}
