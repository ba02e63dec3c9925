//! ### English
//! Tick source driven by the host's vsync / display-link callback.
//!
//! ### 中文
//! 由宿主 vsync / display-link 回调驱动的 tick 源。

use std::sync::OnceLock;

use crate::engine::error::{FrameError, FrameResult};
use crate::engine::lockfree::EpochGate;

use super::{TickCallback, TickSource};

/// ### English
/// Tick source the host fires by calling `signal()` once per redraw opportunity.
///
/// `signal` is lock-free and may be called from any thread; concurrent signals simply tick
/// concurrently (the pump tolerates that).
///
/// ### 中文
/// 由宿主在每个重绘时机调用 `signal()` 触发的 tick 源。
///
/// `signal` 无锁且可在任意线程调用；并发的 signal 会并发 tick（呈现泵可以容忍）。
pub struct ExternalVsync {
    callback: OnceLock<TickCallback>,
    gate: EpochGate,
}

impl ExternalVsync {
    pub fn new() -> Self {
        Self {
            callback: OnceLock::new(),
            gate: EpochGate::new(),
        }
    }

    /// ### English
    /// Delivers one tick. No-op before `start` and after `stop`.
    ///
    /// ### 中文
    /// 投递一次 tick。`start` 之前与 `stop` 之后为空操作。
    #[inline]
    pub fn signal(&self) {
        let Some(callback) = self.callback.get() else {
            return;
        };
        let Some(_guard) = self.gate.enter(0) else {
            return;
        };
        callback();
    }
}

impl Default for ExternalVsync {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ExternalVsync {
    fn start(&self, on_tick: TickCallback) -> FrameResult<()> {
        if self.gate.is_closed(0) {
            return Err(FrameError::registration("vsync source was stopped"));
        }
        self.callback
            .set(on_tick)
            .map_err(|_| FrameError::registration("vsync source already started"))
    }

    fn stop(&self) {
        self.gate.close();
    }
}
