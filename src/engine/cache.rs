//! ### English
//! Padding arithmetic for the ready-state block: the producer-written `latest` word and the
//! pump-written notify flags must not share a cache line.
//!
//! ### 中文
//! 就绪状态块的 padding 计算：生产者写入的 `latest` 与呈现泵写入的通知标志不能共享 cache line。

use std::mem::size_of;

pub(crate) const CACHE_LINE_BYTES: usize = 64;

#[inline]
const fn to_line_end(bytes_used: usize) -> usize {
    (CACHE_LINE_BYTES - bytes_used % CACHE_LINE_BYTES) % CACHE_LINE_BYTES
}

/// ### English
/// Bytes of padding that follow a lone `T` so the next field starts a fresh line.
///
/// ### 中文
/// 单独一个 `T` 之后的填充字节数，使下一个字段从新的 cache line 开始。
#[inline]
pub(crate) const fn pad_after<T>() -> usize {
    to_line_end(size_of::<T>())
}

/// ### English
/// Same as [`pad_after`] for a `(A, B)` field pair laid out back to back.
///
/// ### 中文
/// 与 [`pad_after`] 相同，用于紧邻排列的 `(A, B)` 两个字段。
#[inline]
pub(crate) const fn pad_after2<A, B>() -> usize {
    to_line_end(size_of::<A>() + size_of::<B>())
}
