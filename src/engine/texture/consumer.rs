//! ### English
//! Consumer endpoint: lock-free access to the latest complete frame.
//!
//! ### 中文
//! 消费者端点：无锁访问最新的完整帧。

use std::sync::Weak;

use crate::engine::frame::{BufferView, FrameInfo, SharedFrameState};

/// ### English
/// Read side of a texture. Cheap to clone; usable from any thread at any cadence.
///
/// ### 中文
/// 纹理的读取端。克隆开销很小；可在任意线程、以任意频率使用。
#[derive(Clone, Default)]
pub struct FrameConsumer {
    frames: Weak<SharedFrameState>,
}

impl FrameConsumer {
    pub(crate) fn new(frames: Weak<SharedFrameState>) -> Self {
        Self { frames }
    }

    /// ### English
    /// Pins and returns the latest complete frame.
    ///
    /// `None` if nothing was committed yet or the texture is no longer active.
    ///
    /// ### 中文
    /// pin 并返回最新的完整帧。
    ///
    /// 若尚未提交任何帧或纹理已不再 active，返回 `None`。
    pub fn copy_current(&self) -> Option<BufferView> {
        let frames = self.frames.upgrade()?;
        if !frames.is_active() {
            return None;
        }
        BufferView::pin_latest(frames)
    }

    /// ### English
    /// Copies the latest frame into host memory; returns the bytes copied (0 without a frame).
    ///
    /// #### Parameters
    /// - `dst`: Destination buffer.
    /// - `dst_stride`: Bytes per destination row.
    ///
    /// ### 中文
    /// 将最新帧复制到宿主内存；返回复制的字节数（无帧时为 0）。
    ///
    /// #### 参数
    /// - `dst`：目标缓冲区。
    /// - `dst_stride`：目标每行字节数。
    pub fn copy_current_into(&self, dst: &mut [u8], dst_stride: usize) -> usize {
        self.copy_current()
            .map_or(0, |view| view.copy_to(dst, dst_stride))
    }

    pub fn current_info(&self) -> Option<FrameInfo> {
        self.copy_current().map(|view| view.info())
    }
}
