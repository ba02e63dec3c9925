//! ### English
//! Pixel formats and the fixed per-instance frame layout.
//!
//! ### 中文
//! 像素格式与每个实例固定的帧布局。

use dpi::PhysicalSize;

/// ### English
/// 32-bit packed pixel format of every buffer in a pool. Fixed at creation; never renegotiated.
///
/// ### 中文
/// 缓冲池中所有缓冲区的 32 位打包像素格式。创建时固定，之后不会重新协商。
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// ### English
    /// Bytes `B, G, R, A` in memory (a little-endian `0xAARRGGBB` word).
    ///
    /// ### 中文
    /// 内存字节顺序为 `B, G, R, A`（小端 `0xAARRGGBB` 字）。
    #[default]
    Bgra8888 = 0,
    /// ### English
    /// Bytes `R, G, B, A` in memory.
    ///
    /// ### 中文
    /// 内存字节顺序为 `R, G, B, A`。
    Rgba8888 = 1,
}

impl PixelFormat {
    /// ### English
    /// Decodes the C ABI format tag.
    ///
    /// ### 中文
    /// 解码 C ABI 的格式标签。
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Bgra8888),
            1 => Some(Self::Rgba8888),
            _ => None,
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    /// ### English
    /// Encodes a packed `0xAARRGGBB` color into this format's in-memory byte order.
    ///
    /// ### 中文
    /// 将打包的 `0xAARRGGBB` 颜色编码为该格式的内存字节顺序。
    #[inline]
    pub fn encode_argb(self, argb: u32) -> [u8; 4] {
        let [b, g, r, a] = argb.to_le_bytes();
        match self {
            Self::Bgra8888 => [b, g, r, a],
            Self::Rgba8888 => [r, g, b, a],
        }
    }

    /// ### English
    /// Decodes one pixel in this format back into a packed `0xAARRGGBB` color.
    ///
    /// ### 中文
    /// 将该格式的单个像素解码回打包的 `0xAARRGGBB` 颜色。
    #[inline]
    pub fn decode_argb(self, px: [u8; 4]) -> u32 {
        let [b, g, r, a] = match self {
            Self::Bgra8888 => px,
            Self::Rgba8888 => [px[2], px[1], px[0], px[3]],
        };
        u32::from_le_bytes([b, g, r, a])
    }
}

/// ### English
/// Fixed geometry of every buffer in a pool.
///
/// Rows are tightly packed: `stride == width * bytes_per_pixel`.
///
/// ### 中文
/// 缓冲池中每个缓冲区的固定几何信息。
///
/// 行数据紧密排列：`stride == width * bytes_per_pixel`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    pub size: PhysicalSize<u32>,
    pub format: PixelFormat,
    /// ### English
    /// Bytes per row.
    ///
    /// ### 中文
    /// 每行字节数。
    pub stride: usize,
}

impl FrameLayout {
    /// ### English
    /// Computes the layout, or `None` for a zero-sized frame or a byte size that overflows `usize`.
    ///
    /// ### 中文
    /// 计算布局；若帧尺寸为 0 或字节数溢出 `usize` 则返回 `None`。
    pub fn new(size: PhysicalSize<u32>, format: PixelFormat) -> Option<Self> {
        if size.width == 0 || size.height == 0 {
            return None;
        }

        let stride = (size.width as usize).checked_mul(format.bytes_per_pixel())?;
        stride.checked_mul(size.height as usize)?;
        Some(Self {
            size,
            format,
            stride,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// ### English
    /// Total bytes of one buffer.
    ///
    /// ### 中文
    /// 单个缓冲区的总字节数。
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.stride * self.size.height as usize
    }
}
