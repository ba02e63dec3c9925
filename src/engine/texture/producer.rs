//! ### English
//! Producer endpoint: acquire a spare buffer, fill it, commit it.
//!
//! ### 中文
//! 生产者端点：获取空闲缓冲区、填充、提交。

use std::fmt;
use std::sync::Weak;

use tracing::{trace, warn};

use crate::engine::error::{FrameError, FrameResult};
use crate::engine::frame::{BufferHandle, FrameLayout, SharedFrameState};

/// ### English
/// The single producer of a texture. Owned by the producer thread; never blocks.
///
/// ### 中文
/// 纹理唯一的生产者。由生产者线程持有；从不阻塞。
pub struct FrameProducer {
    frames: Weak<SharedFrameState>,
    /// ### English
    /// Sequence number of the last committed frame.
    ///
    /// ### 中文
    /// 最近一次提交帧的序号。
    last_seq: u64,
}

impl FrameProducer {
    pub(crate) fn new(frames: Weak<SharedFrameState>) -> Self {
        Self {
            frames,
            last_seq: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frames
            .upgrade()
            .is_some_and(|frames| frames.is_active())
    }

    pub fn layout(&self) -> Option<FrameLayout> {
        self.frames.upgrade().map(|frames| frames.pool().layout())
    }

    /// ### English
    /// Hands out a buffer that is not the ready one.
    ///
    /// Returns `None` if the texture is not active, or (rarely) if every spare buffer is still
    /// pinned by a reader view; the caller then skips this frame.
    ///
    /// ### 中文
    /// 返回一个非 ready 的缓冲区。
    ///
    /// 若纹理未处于 active 状态，或（极少数情况下）所有空闲缓冲区仍被读取视图 pin 住，则返回 `None`；
    /// 调用方应跳过这一帧。
    pub fn acquire_writable(&mut self) -> Option<BufferHandle<'_>> {
        let frames = self.frames.upgrade()?;
        if !frames.is_active() {
            return None;
        }

        let Some(slot) = frames.writable_slot() else {
            trace!("every spare buffer is pinned by a reader; dropping frame");
            return None;
        };
        Some(BufferHandle::new(frames, slot, &mut self.last_seq))
    }

    /// ### English
    /// Publishes `handle` as the latest frame (same as `BufferHandle::commit`).
    ///
    /// ### 中文
    /// 将 `handle` 发布为最新帧（等同于 `BufferHandle::commit`）。
    #[inline]
    pub fn commit(handle: BufferHandle<'_>) -> FrameResult<u64> {
        handle.commit()
    }

    /// ### English
    /// Acquires a buffer, copies a host frame into it and commits it.
    ///
    /// Returns `Ok(None)` if the frame was dropped because no spare buffer was free. A source that
    /// is too short fails with `CopyFailed` (logged); the previous frame stays current.
    ///
    /// #### Parameters
    /// - `src`: Source pixels in the texture's format.
    /// - `src_stride`: Bytes per source row.
    ///
    /// ### 中文
    /// 获取缓冲区，将宿主帧复制进去并提交。
    ///
    /// 若因没有空闲缓冲区而丢弃该帧，返回 `Ok(None)`。源数据过短时返回 `CopyFailed`（并记录日志），
    /// 之前的帧保持为当前帧。
    ///
    /// #### 参数
    /// - `src`：纹理格式的源像素。
    /// - `src_stride`：源数据每行字节数。
    pub fn write_frame(&mut self, src: &[u8], src_stride: usize) -> FrameResult<Option<u64>> {
        self.produce_with(|buf| buf.copy_from(src, src_stride))
    }

    /// ### English
    /// Acquires a buffer, lets `fill` write the pixels and commits on success.
    ///
    /// If `fill` fails the frame is dropped, the error logged, and `CopyFailed` returned.
    ///
    /// ### 中文
    /// 获取缓冲区，由 `fill` 写入像素，成功后提交。
    ///
    /// 若 `fill` 失败，则丢弃该帧、记录错误并返回 `CopyFailed`。
    pub fn produce_with<E, F>(&mut self, fill: F) -> FrameResult<Option<u64>>
    where
        E: fmt::Display,
        F: FnOnce(&mut BufferHandle<'_>) -> Result<(), E>,
    {
        if !self.is_active() {
            return Err(FrameError::NotActive);
        }
        let Some(mut handle) = self.acquire_writable() else {
            return Ok(None);
        };

        if let Err(err) = fill(&mut handle) {
            warn!(slot = handle.index(), %err, "frame fill failed; dropping frame");
            return Err(FrameError::copy_failed(err.to_string()));
        }
        handle.commit().map(Some)
    }
}
