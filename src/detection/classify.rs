use crate::config::DetectorConfig;
use crate::proximity::ProximityResult;

/// 最近点距離と位置関係からフレーム単位の接触を判定する
///
/// 顔の前の手はZ補正済みなので狭い閾値、横の手は画面上距離に頼るため広い閾値を使う。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionClassifier {
    front_threshold: f32,
    side_threshold: f32,
}

impl DetectionClassifier {
    pub fn new(front_threshold: f32, side_threshold: f32) -> Self {
        Self { front_threshold, side_threshold }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.front_threshold, config.side_threshold)
    }

    pub fn threshold(&self, in_front_of_face: bool) -> f32 {
        if in_front_of_face {
            self.front_threshold
        } else {
            self.side_threshold
        }
    }

    pub fn classify(&self, proximity: Option<&ProximityResult>, in_front_of_face: bool) -> bool {
        match proximity {
            Some(p) => p.distance < self.threshold(in_front_of_face),
            None => false,
        }
    }
}

impl Default for DetectionClassifier {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}
