//! ### English
//! Spin, then yield, then sleep backoff for teardown waits.
//!
//! Waits on an in-flight tick or UI hand-off are usually a few microseconds, but a host callback
//! may run for a whole frame, so the helper degrades to short sleeps instead of yielding forever.
//!
//! ### 中文
//! 用于销毁等待的“自旋 → 让出调度 → 休眠”退避工具。
//!
//! 等待进行中的 tick 或 UI 交接通常只需数微秒，但宿主回调可能运行一整帧，
//! 因此最终退化为短暂休眠，而不是无限 yield。

use std::thread;
use std::time::Duration;

/// ### English
/// Spin budget before switching to `yield_now()`.
///
/// ### 中文
/// 在切换到 `yield_now()` 之前允许的自旋次数预算。
const SPIN_LIMIT: u32 = 64;

/// ### English
/// Step count after which every snooze sleeps.
///
/// ### 中文
/// 超过该步数后每次退避都会休眠。
const YIELD_LIMIT: u32 = SPIN_LIMIT + 256;

const SLEEP_STEP: Duration = Duration::from_micros(200);

/// ### English
/// Spin/yield/sleep backoff state.
///
/// ### 中文
/// “自旋/让出调度/休眠”的退避状态。
pub(crate) struct Backoff {
    step: u32,
}

impl Backoff {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { step: 0 }
    }

    /// ### English
    /// Performs one backoff step.
    ///
    /// ### 中文
    /// 执行一次退避步骤。
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.step < SPIN_LIMIT {
            std::hint::spin_loop();
        } else if self.step < YIELD_LIMIT {
            thread::yield_now();
        } else {
            thread::sleep(SLEEP_STEP);
        }
        self.step = self.step.saturating_add(1);
    }
}
