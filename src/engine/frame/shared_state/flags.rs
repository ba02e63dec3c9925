//! ### English
//! Notification flags (dirty / notify-scheduled) and the active flag stored in `SharedFrameState`.
//!
//! ### 中文
//! `SharedFrameState` 中存储的通知标记（dirty / notify-scheduled）与 active 标记。

use std::sync::atomic::Ordering;

use super::SharedFrameState;

impl SharedFrameState {
    /// ### English
    /// Cheap idle probe: Relaxed load of `dirty`, no write.
    ///
    /// ### 中文
    /// 低开销空闲探测：Relaxed 读取 `dirty`，不写入。
    #[inline]
    pub(crate) fn is_dirty_relaxed(&self) -> bool {
        self.frame_meta.flags.dirty.load(Ordering::Relaxed)
    }

    /// ### English
    /// Atomically clears `dirty` and returns whether it was set.
    ///
    /// ### 中文
    /// 原子地清除 `dirty` 并返回其之前是否被置位。
    #[inline]
    pub(crate) fn take_dirty(&self) -> bool {
        self.frame_meta.flags.dirty.swap(false, Ordering::AcqRel)
    }

    /// ### English
    /// Puts a notification debt back so the next pump tick retries it.
    ///
    /// ### 中文
    /// 归还通知欠账，让下一次呈现泵 tick 重试。
    #[inline]
    pub(crate) fn mark_dirty(&self) {
        self.frame_meta.flags.dirty.store(true, Ordering::Release);
    }

    /// ### English
    /// Claims notification duty (`false -> true` CAS). Returns `false` if one is already in flight.
    ///
    /// ### 中文
    /// 认领通知职责（`false -> true` CAS）。若已有通知在途则返回 `false`。
    #[inline]
    pub(crate) fn try_schedule_notify(&self) -> bool {
        self.frame_meta
            .flags
            .notify_scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// ### English
    /// Clears `notify_scheduled` once the host notification has been delivered.
    ///
    /// ### 中文
    /// 宿主通知送达后清除 `notify_scheduled`。
    #[inline]
    pub(crate) fn finish_notify(&self) {
        self.frame_meta
            .flags
            .notify_scheduled
            .store(false, Ordering::Release);
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_notify_scheduled(&self) -> bool {
        self.frame_meta.flags.notify_scheduled.load(Ordering::Acquire)
    }

    /// ### English
    /// Sets the active flag (cleared once on dispose).
    ///
    /// #### Parameters
    /// - `active`: Whether producers and readers should still be served.
    ///
    /// ### 中文
    /// 设置 active 标记（dispose 时清除一次）。
    ///
    /// #### 参数
    /// - `active`：是否继续为生产者与读者服务。
    pub(crate) fn set_active(&self, active: bool) {
        self.frame_meta.flags.active.store(active, Ordering::Release);
    }

    /// ### English
    /// Returns whether the texture is still active.
    ///
    /// ### 中文
    /// 返回纹理是否仍为 active。
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.frame_meta.flags.active.load(Ordering::Acquire)
    }
}
