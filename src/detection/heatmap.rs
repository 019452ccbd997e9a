use serde::Serialize;
use std::collections::HashMap;

/// インデックスごとの出現回数。未登録のキーは 0。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap {
    counts: HashMap<usize, u32>,
}

impl CountMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, index: usize) {
        *self.counts.entry(index).or_insert(0) += 1;
    }

    /// 0 になったキーは削除する
    pub fn decrement(&mut self, index: usize) {
        if let Some(c) = self.counts.get_mut(&index) {
            *c = c.saturating_sub(1);
            if *c == 0 {
                self.counts.remove(&index);
            }
        }
    }

    pub fn max(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// 最大値で正規化したヒートマップ
    pub fn normalized(&self) -> HeatMap {
        let max = self.max();
        if max == 0 {
            return HeatMap::default();
        }
        let values = self
            .counts
            .iter()
            .map(|(&k, &c)| (k, c as f32 / max as f32))
            .collect();
        HeatMap { values }
    }
}

/// ランドマークインデックス → 正規化強度 [0, 1]。未登録のインデックスは 0.0。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatMap {
    values: HashMap<usize, f32>,
}

impl HeatMap {
    pub fn get(&self, index: usize) -> f32 {
        self.values.get(&index).copied().unwrap_or(0.0)
    }

    /// 値が 0 より大きいインデックスの数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// インデックス昇順
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        let mut keys: Vec<usize> = self.values.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().map(move |k| (k, self.values[&k]))
    }

    /// 0..len の密な配列に展開する
    pub fn to_dense(&self, len: usize) -> Vec<f32> {
        (0..len).map(|i| self.get(i)).collect()
    }
}

/// ヒート値を 0xRRGGBB に変換する線形グラデーション
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPalette {
    stops: Vec<[u8; 3]>,
}

impl HeatPalette {
    /// stops は2色以上。1色なら単色。
    pub fn new(stops: Vec<[u8; 3]>) -> Self {
        Self { stops }
    }

    /// 顔用: 薄いオレンジ → 暗い赤
    pub fn face() -> Self {
        Self::new(vec![[0xff, 0xf7, 0xec], [0xfc, 0x8d, 0x59], [0x7f, 0x00, 0x00]])
    }

    /// 手用: skyblue → navy
    pub fn hand() -> Self {
        Self::new(vec![[0x87, 0xce, 0xeb], [0x00, 0x00, 0x80]])
    }

    pub fn color(&self, value: f32) -> u32 {
        let rgb = match self.stops.len() {
            0 => [0, 0, 0],
            1 => self.stops[0],
            n => {
                let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
                let pos = t * (n - 1) as f32;
                let i = (pos.floor() as usize).min(n - 2);
                let f = pos - i as f32;
                let (a, b) = (self.stops[i], self.stops[i + 1]);
                std::array::from_fn(|c| (a[c] as f32 + (b[c] as f32 - a[c] as f32) * f).round() as u8)
            }
        };
        (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
    }

    pub fn colorize(&self, heat: &HeatMap, len: usize) -> Vec<u32> {
        (0..len).map(|i| self.color(heat.get(i))).collect()
    }
}
