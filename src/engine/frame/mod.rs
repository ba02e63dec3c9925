//! ### English
//! Lock-free double-buffered frame storage shared between the producer thread and any number of
//! presentation-side readers. Uses atomics only; no OS locks on the hot path.
//!
//! ### 中文
//! 生产者线程与任意数量呈现侧读取者之间共享的无锁双缓冲帧存储。
//! 仅使用原子操作；热路径不使用系统锁。
mod format;
mod handle;
mod pool;
mod shared_state;
mod slot;
mod view;

pub use format::{FrameLayout, PixelFormat};
pub use handle::BufferHandle;
pub use pool::FrameBufferPool;
pub(crate) use shared_state::SharedFrameState;
pub use view::{BufferView, FrameInfo};

/// ### English
/// Minimum number of buffers in a pool (double buffering).
///
/// ### 中文
/// 缓冲池的最小缓冲区数量（双缓冲）。
pub const MIN_BUFFER_COUNT: usize = 2;

/// ### English
/// Maximum number of buffers in a pool; bounded by the slot bits packed into the ready word.
///
/// ### 中文
/// 缓冲池的最大缓冲区数量；受 ready 字中打包的槽位位数限制。
pub const MAX_BUFFER_COUNT: usize = 1 << SLOT_INDEX_BITS;

const SLOT_INDEX_BITS: u64 = 3;
