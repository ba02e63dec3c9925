use crate::engine::cache::{pad_after, pad_after2};
use crate::engine::sync::{AtomicBool, AtomicU64};

use super::SLOT_INDEX_BITS;
use super::pool::FrameBufferPool;
use super::slot::SlotPin;

const LATEST_PAD_BYTES: usize = pad_after::<AtomicU64>();
const NOTIFY_PAD_BYTES: usize = pad_after2::<AtomicBool, AtomicBool>();

#[inline]
pub(super) fn pack_latest(frame_seq: u64, slot: usize) -> u64 {
    (frame_seq << SLOT_INDEX_BITS) | (slot as u64 & ((1u64 << SLOT_INDEX_BITS) - 1))
}

#[inline]
pub(super) fn unpack_latest(packed: u64) -> (u64, usize) {
    (
        packed >> SLOT_INDEX_BITS,
        (packed & ((1u64 << SLOT_INDEX_BITS) - 1)) as usize,
    )
}

/// ### English
/// Lock-free shared state for one texture: the buffer pool plus the ready-state publisher.
///
/// `latest_packed` is written only by commit; `dirty` / `notify_scheduled` are written by commit
/// (dirty = true), the presentation pump and its UI-side completion.
///
/// ### 中文
/// 单个纹理的无锁共享状态：缓冲池 + 就绪状态发布器。
///
/// `latest_packed` 仅由 commit 写入；`dirty` / `notify_scheduled` 由 commit（dirty = true）、
/// 呈现泵及其 UI 侧完成回调写入。
pub(crate) struct SharedFrameState {
    /// ### English
    /// Fixed buffer pool (never resized).
    ///
    /// ### 中文
    /// 固定缓冲池（永不调整大小）。
    pool: FrameBufferPool,
    /// ### English
    /// Per-slot reader pins.
    ///
    /// ### 中文
    /// 每个槽位的读者 pin。
    pins: Box<[SlotPin]>,
    frame_meta: FrameMeta,
}

#[repr(C, align(64))]
struct FrameMeta {
    /// ### English
    /// Packed `(frame_seq, slot)` naming the latest complete frame; `frame_seq == 0` means
    /// nothing was committed yet.
    ///
    /// ### 中文
    /// 指向最新完整帧的 packed `(frame_seq, slot)`；`frame_seq == 0` 表示尚未提交任何帧。
    latest_packed: AtomicU64,
    /// ### English
    /// Padding to keep the pump-written flags off the producer's cache line.
    ///
    /// ### 中文
    /// 填充：让呈现泵写入的标记位与生产者的 cache line 分离。
    _pad_latest: [u8; LATEST_PAD_BYTES],
    flags: FrameFlags,
}

#[repr(C, align(64))]
struct FrameFlags {
    /// ### English
    /// A commit happened since the pump last looked (a host notification is owed).
    ///
    /// ### 中文
    /// 自呈现泵上次检查以来发生过 commit（欠宿主一次通知）。
    dirty: AtomicBool,
    /// ### English
    /// A host notification has been handed off and has not completed yet.
    ///
    /// ### 中文
    /// 已移交一次宿主通知且尚未完成。
    notify_scheduled: AtomicBool,
    _padding: [u8; NOTIFY_PAD_BYTES],
    /// ### English
    /// Cleared on dispose; producers and readers stop being served once it is false.
    ///
    /// ### 中文
    /// dispose 时清除；为 false 后不再为生产者与读者服务。
    active: AtomicBool,
}

impl SharedFrameState {
    /// ### English
    /// Wraps a freshly allocated pool. Nothing is committed and the state is active.
    ///
    /// ### 中文
    /// 包装新分配的缓冲池。初始无已提交帧，状态为 active。
    pub(crate) fn new(pool: FrameBufferPool) -> Self {
        let pins = (0..pool.len()).map(|_| SlotPin::new()).collect();
        Self {
            pool,
            pins,
            frame_meta: FrameMeta {
                latest_packed: AtomicU64::new(0),
                _pad_latest: [0; LATEST_PAD_BYTES],
                flags: FrameFlags {
                    dirty: AtomicBool::new(false),
                    notify_scheduled: AtomicBool::new(false),
                    _padding: [0; NOTIFY_PAD_BYTES],
                    active: AtomicBool::new(true),
                },
            },
        }
    }

    #[inline]
    pub(crate) fn pool(&self) -> &FrameBufferPool {
        &self.pool
    }
}

mod acquire;
mod flags;
mod publish;
mod release;
