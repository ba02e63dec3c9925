//! ### English
//! Periodic redraw-opportunity sources driving the presentation pump.
//!
//! Supports external-vsync driven ticks (the host forwards its display-link callback) and
//! fixed-interval ticks on a shared scheduler thread.
//!
//! ### 中文
//! 驱动呈现泵的周期性重绘时机信号源。
//!
//! 支持外部 vsync 驱动的 tick（宿主转发其 display-link 回调）以及共享调度线程上的固定间隔 tick。
mod fixed_interval;
mod scheduler;
mod vsync_driver;

use std::sync::Arc;
use std::time::Duration;

use super::error::FrameResult;

pub use fixed_interval::FixedIntervalTicks;
pub use scheduler::RefreshScheduler;
pub use vsync_driver::ExternalVsync;

/// ### English
/// Callback invoked once per redraw opportunity.
///
/// ### 中文
/// 每个重绘时机调用一次的回调。
pub type TickCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// ### English
/// Source of periodic redraw-opportunity signals.
///
/// A source drives exactly one callback. After `stop` returns, no tick is running and none will
/// start, unless `stop` is called from inside the tick itself (the running tick then finishes
/// normally). A stopped source cannot be restarted.
///
/// ### 中文
/// 周期性重绘时机信号源。
///
/// 一个信号源只驱动一个回调。`stop` 返回后不会有 tick 正在运行或即将开始，
/// 除非 `stop` 是在 tick 内部调用的（此时正在运行的 tick 会正常结束）。已停止的信号源不能重新启动。
pub trait TickSource: Send + Sync + 'static {
    /// ### English
    /// Starts delivering ticks to `on_tick`.
    ///
    /// Fails with `Registration` if the source was already started or stopped.
    ///
    /// ### 中文
    /// 开始向 `on_tick` 投递 tick。
    ///
    /// 若信号源已启动或已停止，返回 `Registration` 错误。
    fn start(&self, on_tick: TickCallback) -> FrameResult<()>;

    fn stop(&self);
}

/// ### English
/// How a texture created through the C ABI is ticked.
///
/// ### 中文
/// 通过 C ABI 创建的纹理的 tick 方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// ### English
    /// The host calls `frame_relay_texture_tick` from its vsync callback.
    ///
    /// ### 中文
    /// 宿主在其 vsync 回调中调用 `frame_relay_texture_tick`。
    ExternalVsync,
    FixedInterval { fps: u32 },
}

impl RefreshMode {
    /// ### English
    /// Maps the C ABI `target_fps` argument (`0` = external vsync).
    ///
    /// ### 中文
    /// 映射 C ABI 的 `target_fps` 参数（`0` = 外部 vsync）。
    pub fn from_target_fps(target_fps: u32) -> Self {
        match target_fps {
            0 => Self::ExternalVsync,
            fps => Self::FixedInterval { fps },
        }
    }
}

/// ### English
/// Frame period for `fps` (clamped to at least 1 fps).
///
/// ### 中文
/// `fps` 对应的帧间隔（至少按 1 fps 计算）。
pub(crate) fn frame_duration(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}
