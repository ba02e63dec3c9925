use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use crate::engine::error::{FrameError, FrameResult};
use crate::engine::lockfree::EpochGate;

use super::scheduler::RefreshScheduler;
use super::{TickCallback, TickSource, frame_duration};

/// ### English
/// Tick source that fires at a fixed interval on the shared `RefreshScheduler` thread, for hosts
/// without a vsync callback (`target_fps != 0` path).
///
/// ### 中文
/// 在共享 `RefreshScheduler` 线程上按固定间隔触发的 tick 源，用于没有 vsync 回调的宿主
/// （`target_fps != 0` 路径）。
pub struct FixedIntervalTicks {
    scheduler: Arc<RefreshScheduler>,
    period: Duration,
    state: Arc<IntervalState>,
}

struct IntervalState {
    callback: OnceLock<TickCallback>,
    gate: EpochGate,
}

impl IntervalState {
    /// ### English
    /// Runs one tick; `false` once the source was stopped (drops the repeating job).
    ///
    /// ### 中文
    /// 运行一次 tick；信号源停止后返回 `false`（移除重复任务）。
    fn fire(&self) -> bool {
        let Some(_guard) = self.gate.enter(0) else {
            return false;
        };
        if let Some(callback) = self.callback.get() {
            callback();
        }
        true
    }
}

impl FixedIntervalTicks {
    /// ### English
    /// Creates a fixed-interval tick source.
    ///
    /// #### Parameters
    /// - `scheduler`: Shared scheduler thread.
    /// - `fps`: Ticks per second (`0` is treated as `1`).
    ///
    /// ### 中文
    /// 创建固定间隔 tick 源。
    ///
    /// #### 参数
    /// - `scheduler`：共享调度线程。
    /// - `fps`：每秒 tick 次数（`0` 按 `1` 处理）。
    pub fn new(scheduler: Arc<RefreshScheduler>, fps: u32) -> Self {
        Self {
            scheduler,
            period: frame_duration(fps),
            state: Arc::new(IntervalState {
                callback: OnceLock::new(),
                gate: EpochGate::new(),
            }),
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl TickSource for FixedIntervalTicks {
    fn start(&self, on_tick: TickCallback) -> FrameResult<()> {
        if self.state.gate.is_closed(0) {
            return Err(FrameError::registration("interval source was stopped"));
        }
        self.state
            .callback
            .set(on_tick)
            .map_err(|_| FrameError::registration("interval source already started"))?;

        let state: Weak<IntervalState> = Arc::downgrade(&self.state);
        self.scheduler.schedule_repeating(
            self.period,
            Box::new(move || state.upgrade().is_some_and(|state| state.fire())),
        );
        Ok(())
    }

    fn stop(&self) {
        self.state.gate.close();
    }
}

impl Drop for FixedIntervalTicks {
    fn drop(&mut self) {
        self.stop();
    }
}
