use std::sync::atomic::Ordering;

use super::SharedFrameState;

impl SharedFrameState {
    /// ### English
    /// Releases one reader pin taken by `pin_ready`.
    ///
    /// Release ordering makes the reader's loads happen-before any later producer write to the slot.
    ///
    /// ### 中文
    /// 释放一次由 `pin_ready` 获取的读者 pin。
    ///
    /// Release 顺序保证读者的读取先于生产者之后对该槽位的写入。
    #[inline]
    pub(crate) fn unpin(&self, slot: usize) {
        let prev = self.pins[slot].readers.fetch_sub(1, Ordering::Release);
        debug_assert!(prev > 0);
    }
}
