use std::sync::atomic::Ordering;

use crate::engine::sync::fence;

use super::SharedFrameState;

impl SharedFrameState {
    /// ### English
    /// Returns `(frame_seq, slot)` of the latest committed frame, or `None` if nothing was
    /// committed yet (Acquire load).
    ///
    /// ### 中文
    /// 返回最新已提交帧的 `(frame_seq, slot)`；若尚未提交任何帧则返回 `None`（Acquire 读取）。
    #[inline]
    pub(crate) fn latest(&self) -> Option<(u64, usize)> {
        let (frame_seq, slot) =
            super::unpack_latest(self.frame_meta.latest_packed.load(Ordering::Acquire));
        (frame_seq != 0).then_some((frame_seq, slot))
    }

    /// ### English
    /// Picks a slot the producer may overwrite: never the ready slot, never a pinned one.
    ///
    /// For N = 2 this is `1 - ready`. Returns `None` only when every candidate is still pinned by
    /// a reader (the producer drops that frame instead of waiting).
    ///
    /// ### 中文
    /// 选出生产者可以覆写的槽位：既不是 ready 槽位，也不是被 pin 的槽位。
    ///
    /// N = 2 时即 `1 - ready`。仅当所有候选槽位仍被读者 pin 时返回 `None`（生产者丢弃该帧而不是等待）。
    #[inline]
    pub(crate) fn writable_slot(&self) -> Option<usize> {
        let (_, ready) =
            super::unpack_latest(self.frame_meta.latest_packed.load(Ordering::Acquire));

        // Pairs with the SeqCst pin + re-check in `pin_ready`: either the reader observes the
        // ready index moving away from its slot, or we observe its pin.
        fence(Ordering::SeqCst);

        let count = self.pool.len();
        (1..count)
            .map(|step| (ready + step) % count)
            .find(|&slot| self.pins[slot].readers.load(Ordering::Acquire) == 0)
    }

    /// ### English
    /// Pins the latest committed slot for reading and returns `(frame_seq, slot)`.
    ///
    /// The pin is validated by re-reading `latest_packed`; if the producer moved on in between,
    /// the pin is dropped and the read retried. A validated pin guarantees the slot holds a
    /// complete frame that the producer will not touch until the pin is released.
    ///
    /// ### 中文
    /// pin 最新已提交的槽位用于读取，并返回 `(frame_seq, slot)`。
    ///
    /// pin 之后会重新读取 `latest_packed` 进行校验；若生产者在此期间已前进，则撤销 pin 并重试。
    /// 校验通过的 pin 保证该槽位持有完整帧，且在 pin 释放前生产者不会触碰它。
    pub(crate) fn pin_ready(&self) -> Option<(u64, usize)> {
        loop {
            let (_, slot) = self.latest()?;
            self.pins[slot].readers.fetch_add(1, Ordering::SeqCst);

            let (frame_seq, current) =
                super::unpack_latest(self.frame_meta.latest_packed.load(Ordering::SeqCst));
            if current == slot {
                return Some((frame_seq, slot));
            }

            self.unpin(slot);
        }
    }

    /// ### English
    /// Current reader pin count of a slot (diagnostics and tests).
    ///
    /// ### 中文
    /// 某个槽位当前的读者 pin 计数（诊断与测试用）。
    #[cfg(test)]
    #[inline]
    pub(crate) fn pinned_readers(&self, slot: usize) -> usize {
        self.pins[slot].readers.load(Ordering::Relaxed)
    }
}
