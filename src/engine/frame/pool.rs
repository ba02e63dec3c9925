//! ### English
//! Fixed pool of N equally-sized pixel buffers, allocated once at creation.
//!
//! ### 中文
//! 由 N 个等大小像素缓冲区组成的固定缓冲池，仅在创建时分配一次。

use std::cell::UnsafeCell;

use dpi::PhysicalSize;

use crate::engine::error::{FrameError, FrameResult};

use super::{FrameLayout, MAX_BUFFER_COUNT, MIN_BUFFER_COUNT, PixelFormat};

/// ### English
/// One pixel buffer. Content access is arbitrated by `SharedFrameState` (ready index + reader pins),
/// never by a lock.
///
/// ### 中文
/// 单个像素缓冲区。内容访问由 `SharedFrameState`（ready 索引 + 读者 pin）仲裁，而不是锁。
struct FrameBuffer {
    data: UnsafeCell<Box<[u8]>>,
}

unsafe impl Sync for FrameBuffer {}

/// ### English
/// Ordered set of exactly N frame buffers sharing one layout.
///
/// Buffers never change identity or size; a size change means creating a new pool.
///
/// ### 中文
/// 恰好 N 个共享同一布局的帧缓冲区的有序集合。
///
/// 缓冲区的身份与尺寸永不改变；尺寸变化意味着重新创建缓冲池。
pub struct FrameBufferPool {
    layout: FrameLayout,
    buffers: Box<[FrameBuffer]>,
}

impl FrameBufferPool {
    /// ### English
    /// Allocates `count` zeroed buffers of `size` pixels in `format`.
    ///
    /// Any failure (zero-sized frame, out-of-range count, size overflow, allocator refusal) fails
    /// the whole pool with `AllocationFailed`; no partial pool is ever returned.
    ///
    /// #### Parameters
    /// - `size`: Frame size in pixels.
    /// - `format`: Pixel format shared by every buffer.
    /// - `count`: Number of buffers (`2..=8`).
    ///
    /// ### 中文
    /// 分配 `count` 个尺寸为 `size`、格式为 `format` 的清零缓冲区。
    ///
    /// 任何失败（零尺寸、数量越界、尺寸溢出、分配器拒绝）都会使整个缓冲池以 `AllocationFailed`
    /// 失败；不会返回部分构建的缓冲池。
    ///
    /// #### 参数
    /// - `size`：帧尺寸（像素）。
    /// - `format`：所有缓冲区共享的像素格式。
    /// - `count`：缓冲区数量（`2..=8`）。
    pub fn new(size: PhysicalSize<u32>, format: PixelFormat, count: usize) -> FrameResult<Self> {
        let fail = |reason: &str| FrameError::allocation(size.width, size.height, count, reason);

        if !(MIN_BUFFER_COUNT..=MAX_BUFFER_COUNT).contains(&count) {
            return Err(fail("buffer count out of range"));
        }
        if size.width == 0 || size.height == 0 {
            return Err(fail("zero-sized frame"));
        }
        let layout = FrameLayout::new(size, format).ok_or_else(|| fail("frame size overflow"))?;
        let len = layout.frame_len();

        let mut buffers = Vec::new();
        buffers
            .try_reserve_exact(count)
            .map_err(|err| fail(&err.to_string()))?;
        for _ in 0..count {
            let mut data = Vec::new();
            data.try_reserve_exact(len)
                .map_err(|err| fail(&err.to_string()))?;
            data.resize(len, 0);
            buffers.push(FrameBuffer {
                data: UnsafeCell::new(data.into_boxed_slice()),
            });
        }

        Ok(Self {
            layout,
            buffers: buffers.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// ### English
    /// Number of buffers (N).
    ///
    /// ### 中文
    /// 缓冲区数量（N）。
    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// ### English
    /// Shared view of one buffer.
    ///
    /// # Safety
    /// No writer may hold `slot` for the lifetime of the returned slice.
    ///
    /// ### 中文
    /// 获取某个缓冲区的共享视图。
    ///
    /// # Safety
    /// 在返回切片存活期间，不得有写者持有 `slot`。
    #[inline]
    pub(crate) unsafe fn slot(&self, slot: usize) -> &[u8] {
        unsafe { &*self.buffers[slot].data.get() }
    }

    /// ### English
    /// Exclusive view of one buffer.
    ///
    /// # Safety
    /// The caller must be the only accessor (reader or writer) of `slot` for the lifetime of the
    /// returned slice.
    ///
    /// ### 中文
    /// 获取某个缓冲区的独占视图。
    ///
    /// # Safety
    /// 在返回切片存活期间，调用方必须是 `slot` 的唯一访问者（无论读写）。
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slot_mut(&self, slot: usize) -> &mut [u8] {
        unsafe { &mut *self.buffers[slot].data.get() }
    }
}
