use crate::engine::sync::AtomicUsize;

/// ### English
/// Per-slot reader pin count, one cache line per slot so readers of different buffers never
/// contend.
///
/// ### 中文
/// 每个槽位的读者 pin 计数；每个槽位独占一条 cache line，读取不同缓冲区的读者互不争用。
#[repr(C, align(64))]
pub(super) struct SlotPin {
    /// ### English
    /// Number of live `BufferView`s on this slot. The producer never writes a pinned slot.
    ///
    /// ### 中文
    /// 该槽位上存活的 `BufferView` 数量。生产者不会写入被 pin 的槽位。
    pub(super) readers: AtomicUsize,
}

impl SlotPin {
    pub(super) fn new() -> Self {
        Self {
            readers: AtomicUsize::new(0),
        }
    }
}
