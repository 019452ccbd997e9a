use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::AlertConfig;

/// 通知すべき接触
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    /// セッション開始からの通知回数（この通知を含む）
    pub total: u32,
    /// 直前の集計間隔内の確定検出フレーム数
    pub count: u32,
}

/// 確定検出を一定間隔で集計し、通知のタイミングを決める
///
/// 間隔内の確定フレームが min_count 以上で、まだ通知中でなければ通知する。
/// 集計時点で接触していなければ通知中フラグを下ろす。
#[derive(Debug, Clone)]
pub struct TouchAlert {
    interval: Duration,
    min_count: u32,
    counter: u32,
    total: u32,
    active: bool,
    currently_touched: bool,
    last_tick: Option<Instant>,
}

impl TouchAlert {
    pub fn new(interval: Duration, min_count: u32) -> Self {
        Self {
            interval,
            min_count,
            counter: 0,
            total: 0,
            active: false,
            currently_touched: false,
            last_tick: None,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.interval(), config.min_count)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn observe(&mut self, is_detected: bool) -> Option<AlertEvent> {
        self.observe_at(Instant::now(), is_detected)
    }

    /// フレームの確定判定を記録し、集計間隔が経過していれば集計する
    pub fn observe_at(&mut self, now: Instant, is_detected: bool) -> Option<AlertEvent> {
        if is_detected {
            self.counter += 1;
        }
        self.currently_touched = is_detected;

        let last = *self.last_tick.get_or_insert(now);
        if now.saturating_duration_since(last) >= self.interval {
            self.last_tick = Some(now);
            self.tick()
        } else {
            None
        }
    }

    /// 集計間隔1回分の処理
    pub fn tick(&mut self) -> Option<AlertEvent> {
        let mut event = None;
        if self.counter >= self.min_count && !self.active {
            self.total += 1;
            self.active = true;
            info!("face touched ({} frames), total {}", self.counter, self.total);
            event = Some(AlertEvent {
                total: self.total,
                count: self.counter,
            });
        }
        if !self.currently_touched && self.active {
            debug!("alert cleared");
            self.active = false;
        }
        self.counter = 0;
        event
    }

    pub fn reconfigure(&mut self, config: &AlertConfig) {
        self.interval = config.interval();
        self.min_count = config.min_count;
    }
}

impl Default for TouchAlert {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}
