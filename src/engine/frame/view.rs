//! ### English
//! Read-only access to the latest committed frame (presentation side).
//!
//! ### 中文
//! 对最新已提交帧的只读访问（呈现侧）。

use std::sync::Arc;

use super::{FrameLayout, PixelFormat, SharedFrameState};

/// ### English
/// Metadata of one committed frame.
///
/// ### 中文
/// 单个已提交帧的元数据。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// ### English
    /// Pool index holding the frame.
    ///
    /// ### 中文
    /// 持有该帧的缓冲池索引。
    pub slot: usize,
    /// ### English
    /// Sequence number assigned at commit (starts at 1, strictly increasing).
    ///
    /// ### 中文
    /// commit 时分配的帧序号（从 1 开始，严格递增）。
    pub frame_seq: u64,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: PixelFormat,
}

/// ### English
/// Pinned, read-only view of a committed frame.
///
/// While the view lives the producer never writes its buffer, so the bytes are always one
/// complete frame. Views are meant to be short-lived: with two buffers, a view held across
/// producer commits makes the producer drop frames until it is released.
///
/// ### 中文
/// 被 pin 的已提交帧只读视图。
///
/// 视图存活期间生产者不会写入其缓冲区，因此字节内容始终是一帧完整数据。
/// 视图应短暂持有：双缓冲下若跨越多次 commit 持有视图，生产者会丢帧直到视图释放。
pub struct BufferView {
    frames: Arc<SharedFrameState>,
    slot: usize,
    frame_seq: u64,
}

impl BufferView {
    /// ### English
    /// Pins the latest frame; `None` if nothing was committed.
    ///
    /// ### 中文
    /// pin 最新帧；若尚未提交任何帧则返回 `None`。
    pub(crate) fn pin_latest(frames: Arc<SharedFrameState>) -> Option<Self> {
        let (frame_seq, slot) = frames.pin_ready()?;
        Some(Self {
            frames,
            slot,
            frame_seq,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn frame_seq(&self) -> u64 {
        self.frame_seq
    }

    #[inline]
    pub fn layout(&self) -> FrameLayout {
        self.frames.pool().layout()
    }

    pub fn info(&self) -> FrameInfo {
        let layout = self.layout();
        FrameInfo {
            slot: self.slot,
            frame_seq: self.frame_seq,
            width: layout.width(),
            height: layout.height(),
            stride: layout.stride,
            format: layout.format,
        }
    }

    /// ### English
    /// Raw bytes of the frame, including every row.
    ///
    /// ### 中文
    /// 帧的原始字节（包含所有行）。
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        // Validated pin: the producer does not write this slot until `Drop` releases it.
        unsafe { self.frames.pool().slot(self.slot) }
    }

    /// ### English
    /// Bytes of row `y`, or `None` if out of range.
    ///
    /// ### 中文
    /// 第 `y` 行的字节；越界时返回 `None`。
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let layout = self.layout();
        if y >= layout.height() {
            return None;
        }
        let start = y as usize * layout.stride;
        Some(&self.pixels()[start..start + layout.stride])
    }

    /// ### English
    /// Pixel at `(x, y)` decoded as packed `0xAARRGGBB`.
    ///
    /// ### 中文
    /// 坐标 `(x, y)` 处的像素，解码为打包的 `0xAARRGGBB`。
    pub fn pixel_argb(&self, x: u32, y: u32) -> Option<u32> {
        let layout = self.layout();
        if x >= layout.width() {
            return None;
        }
        let start = x as usize * layout.format.bytes_per_pixel();
        let row = self.row(y)?;
        let px: [u8; 4] = row[start..start + 4].try_into().ok()?;
        Some(layout.format.decode_argb(px))
    }

    /// ### English
    /// Copies the frame into host memory row by row and returns the number of bytes copied.
    ///
    /// Each row copies `min(stride, dst_stride)` bytes; copying stops at the first row that does
    /// not fit in `dst` (including a row whose offset overflows `usize`).
    ///
    /// #### Parameters
    /// - `dst`: Destination buffer.
    /// - `dst_stride`: Bytes per destination row.
    ///
    /// ### 中文
    /// 按行将帧复制到宿主内存，并返回复制的字节数。
    ///
    /// 每行复制 `min(stride, dst_stride)` 字节；遇到第一行放不下（包括偏移溢出 `usize`）时停止复制。
    ///
    /// #### 参数
    /// - `dst`：目标缓冲区。
    /// - `dst_stride`：目标每行字节数。
    pub fn copy_to(&self, dst: &mut [u8], dst_stride: usize) -> usize {
        let layout = self.layout();
        let src = self.pixels();
        let row_len = layout.stride.min(dst_stride);
        if row_len == 0 {
            return 0;
        }

        let mut copied = 0;
        for y in 0..layout.height() as usize {
            let src_start = y * layout.stride;
            let Some(dst_range) = y
                .checked_mul(dst_stride)
                .and_then(|start| Some(start..start.checked_add(row_len)?))
                .filter(|range| range.end <= dst.len())
            else {
                break;
            };
            dst[dst_range].copy_from_slice(&src[src_start..src_start + row_len]);
            copied += row_len;
        }
        copied
    }
}

impl Drop for BufferView {
    fn drop(&mut self) {
        self.frames.unpin(self.slot);
    }
}
