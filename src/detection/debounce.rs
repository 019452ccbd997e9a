use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ConfigError;

/// デバウンス後の検出状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Detection {
    /// 直近 window_size フレームがすべて検出
    pub is_detected: bool,
    /// このフレームで検出が始まった
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Touching,
}

/// フレーム単位の生判定を window_size 連続で確定させるデバウンサ
///
/// バッファ長は window_size + 1。先頭の1サンプルは立ち上がり検出用の文脈。
#[derive(Debug, Clone)]
pub struct DetectionDebouncer {
    window_size: usize,
    buffer: VecDeque<bool>,
}

impl DetectionDebouncer {
    /// window_size は 1 以上
    pub fn new(window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            window_size,
            buffer: Self::idle_buffer(window_size),
        })
    }

    fn idle_buffer(window_size: usize) -> VecDeque<bool> {
        std::iter::repeat(false).take(window_size + 1).collect()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn push(&mut self, sample: bool) {
        self.buffer.pop_front();
        self.buffer.push_back(sample);
    }

    /// サンプルを追加して現在の状態を返す
    pub fn update(&mut self, sample: bool) -> Detection {
        self.push(sample);
        self.current()
    }

    pub fn current(&self) -> Detection {
        let is_detected = self.buffer.iter().skip(1).all(|&s| s);
        let context = self.buffer.front().copied().unwrap_or(false);
        Detection {
            is_detected,
            is_new: is_detected && !context,
        }
    }

    pub fn state(&self) -> DebounceState {
        if self.current().is_detected {
            DebounceState::Touching
        } else {
            DebounceState::Idle
        }
    }

    /// ウィンドウ長を変更する。バッファは全 false に戻る。
    /// 0 は拒否し、現在の状態を維持する。
    pub fn resize(&mut self, window_size: usize) -> Result<(), ConfigError> {
        *self = Self::new(window_size)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.buffer = Self::idle_buffer(self.window_size);
    }
}
