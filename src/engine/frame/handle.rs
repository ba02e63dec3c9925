//! ### English
//! Exclusive write access to one non-ready buffer (producer side).
//!
//! ### 中文
//! 对单个非 ready 缓冲区的独占写访问（生产者侧）。

use std::sync::Arc;

use crate::engine::error::{FrameError, FrameResult};

use super::{FrameLayout, SharedFrameState};

/// ### English
/// Writable buffer handed out by `FrameProducer::acquire_writable`.
///
/// The handle mutably borrows its producer, so a second acquire before `commit` is a compile
/// error, and `commit` consumes the handle, so the buffer cannot be mutated after publishing.
/// Dropping the handle without committing discards the frame.
///
/// The handle keeps the pool alive: a texture disposed while a handle is outstanding frees its
/// buffers only after the handle is gone.
///
/// ### 中文
/// 由 `FrameProducer::acquire_writable` 返回的可写缓冲区。
///
/// 句柄以可变方式借用其生产者，因此 commit 之前再次 acquire 会在编译期报错；`commit` 会消费句柄，
/// 因此发布后无法再修改该缓冲区。不 commit 直接 drop 句柄即丢弃该帧。
///
/// 句柄会保持缓冲池存活：若在句柄未释放时销毁纹理，缓冲区会在句柄释放后才被回收。
pub struct BufferHandle<'p> {
    frames: Arc<SharedFrameState>,
    slot: usize,
    next_seq: &'p mut u64,
}

impl<'p> BufferHandle<'p> {
    pub(crate) fn new(frames: Arc<SharedFrameState>, slot: usize, next_seq: &'p mut u64) -> Self {
        Self {
            frames,
            slot,
            next_seq,
        }
    }

    /// ### English
    /// Pool index of the buffer being written.
    ///
    /// ### 中文
    /// 正在写入的缓冲区在缓冲池中的索引。
    #[inline]
    pub fn index(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn layout(&self) -> FrameLayout {
        self.frames.pool().layout()
    }

    /// ### English
    /// Raw bytes of the buffer (`layout().stride` bytes per row).
    ///
    /// The previous contents are whatever frame last occupied this slot; write a complete frame.
    ///
    /// ### 中文
    /// 缓冲区的原始字节（每行 `layout().stride` 字节）。
    ///
    /// 其原有内容为该槽位上一次承载的帧；调用方需写入完整的一帧。
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        // The slot is neither ready nor pinned (see `writable_slot`), and this handle is the only
        // writer because it borrows the single producer mutably.
        unsafe { self.frames.pool().slot_mut(self.slot) }
    }

    /// ### English
    /// Mutable bytes of row `y`, or `None` if out of range.
    ///
    /// ### 中文
    /// 第 `y` 行的可变字节；越界时返回 `None`。
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let layout = self.layout();
        if y >= layout.height() {
            return None;
        }
        let start = y as usize * layout.stride;
        Some(&mut self.pixels_mut()[start..start + layout.stride])
    }

    /// ### English
    /// Fills every pixel with a packed `0xAARRGGBB` color, encoded in the pool's pixel format.
    ///
    /// ### 中文
    /// 用打包的 `0xAARRGGBB` 颜色填充所有像素（按缓冲池像素格式编码）。
    pub fn fill_argb(&mut self, argb: u32) {
        let px = self.layout().format.encode_argb(argb);
        for chunk in self.pixels_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// ### English
    /// Copies a host frame into the buffer row by row.
    ///
    /// Fails with `CopyFailed` if `src_stride` is shorter than a row or `src` holds fewer than
    /// `height` rows; the buffer is then left partially written and must not be committed.
    ///
    /// #### Parameters
    /// - `src`: Source pixels in the pool's format.
    /// - `src_stride`: Bytes per source row (may include padding).
    ///
    /// ### 中文
    /// 按行将宿主帧复制到缓冲区。
    ///
    /// 若 `src_stride` 小于一行，或 `src` 不足 `height` 行，则返回 `CopyFailed`；
    /// 此时缓冲区处于部分写入状态，不得 commit。
    ///
    /// #### 参数
    /// - `src`：缓冲池格式的源像素。
    /// - `src_stride`：源数据每行字节数（可包含填充）。
    pub fn copy_from(&mut self, src: &[u8], src_stride: usize) -> FrameResult<()> {
        let layout = self.layout();
        let row_len = layout.stride;
        let height = layout.height() as usize;

        if src_stride < row_len {
            return Err(FrameError::copy_failed(format!(
                "source stride {src_stride} is shorter than row length {row_len}"
            )));
        }
        let Some(needed) = src_stride
            .checked_mul(height - 1)
            .and_then(|bytes| bytes.checked_add(row_len))
        else {
            return Err(FrameError::copy_failed(format!(
                "source stride {src_stride} overflows for {height} rows"
            )));
        };
        if src.len() < needed {
            return Err(FrameError::copy_failed(format!(
                "source holds {} bytes, {needed} needed",
                src.len()
            )));
        }

        let dst = self.pixels_mut();
        for y in 0..height {
            let src_start = y * src_stride;
            let dst_start = y * row_len;
            dst[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }
        Ok(())
    }

    /// ### English
    /// Publishes the buffer as the latest frame and returns its frame sequence number.
    ///
    /// Returns `NotActive` (and publishes nothing) if the texture was disposed while the handle
    /// was held.
    ///
    /// ### 中文
    /// 将缓冲区发布为最新帧，并返回其帧序号。
    ///
    /// 若在持有句柄期间纹理已被销毁，则返回 `NotActive`（不发布任何内容）。
    pub fn commit(self) -> FrameResult<u64> {
        if !self.frames.is_active() {
            return Err(FrameError::NotActive);
        }

        *self.next_seq += 1;
        let frame_seq = *self.next_seq;
        self.frames.publish(self.slot, frame_seq);
        Ok(frame_seq)
    }
}
