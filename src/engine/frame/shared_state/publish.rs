use std::sync::atomic::Ordering;

use super::SharedFrameState;

impl SharedFrameState {
    /// ### English
    /// Publishes a fully written slot as the latest frame and marks a host notification as owed.
    ///
    /// This is the single synchronization point between the producer and everything downstream:
    /// the Release store on `latest_packed` pairs with the Acquire loads in `pin_ready`.
    ///
    /// #### Parameters
    /// - `slot`: Slot the producer just finished writing.
    /// - `frame_seq`: Non-zero, strictly increasing frame sequence number.
    ///
    /// ### 中文
    /// 将写入完成的槽位发布为最新帧，并标记欠宿主一次通知。
    ///
    /// 这是生产者与下游之间唯一的同步点：`latest_packed` 的 Release 写入与 `pin_ready` 中的
    /// Acquire 读取配对。
    ///
    /// #### 参数
    /// - `slot`：生产者刚写完的槽位。
    /// - `frame_seq`：非 0 且严格递增的帧序号。
    #[inline]
    pub(crate) fn publish(&self, slot: usize, frame_seq: u64) {
        debug_assert!(frame_seq != 0);
        debug_assert!(slot < self.pool.len());
        self.frame_meta
            .latest_packed
            .store(super::pack_latest(frame_seq, slot), Ordering::Release);
        self.frame_meta.flags.dirty.store(true, Ordering::Release);
    }
}
