/// 手ランドマーク数（handpose 21点）
pub const HAND_LANDMARK_COUNT: usize = 21;

/// 指ごとのポリライン (手首 → 指先)
pub const HAND_FINGERS: [(&str, [usize; 5]); 5] = [
    ("thumb", [0, 1, 2, 3, 4]),
    ("index_finger", [0, 5, 6, 7, 8]),
    ("middle_finger", [0, 9, 10, 11, 12]),
    ("ring_finger", [0, 13, 14, 15, 16]),
    ("pinky", [0, 17, 18, 19, 20]),
];

/// 手ランドマークのインデックスが属する指の名前。手首(0)は None。
pub fn finger_of(index: usize) -> Option<&'static str> {
    if index == 0 || index >= HAND_LANDMARK_COUNT {
        return None;
    }
    HAND_FINGERS
        .iter()
        .find(|(_, chain)| chain[1..].contains(&index))
        .map(|(name, _)| *name)
}
