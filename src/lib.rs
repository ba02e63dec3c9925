/// ### English
/// `frame_relay` crate root.
/// Exposes the C ABI via `ffi`; the lock-free frame relay lives under `engine`.
///
/// ### 中文
/// `frame_relay` 的 crate 根。
/// 通过 `ffi` 导出 C ABI；无锁帧中继的核心实现位于 `engine` 模块。
mod engine;
mod ffi;

pub use engine::dispatch::{InlineDispatcher, UiDispatcher, UiTask, UiTaskQueue};
pub use engine::error::{FrameError, FrameResult};
pub use engine::flags;
pub use engine::frame::{
    BufferHandle, BufferView, FrameBufferPool, FrameInfo, FrameLayout, MAX_BUFFER_COUNT,
    MIN_BUFFER_COUNT, PixelFormat,
};
pub use engine::host::{TextureHost, TextureId};
pub use engine::refresh::{
    ExternalVsync, FixedIntervalTicks, RefreshMode, RefreshScheduler, TickCallback, TickSource,
};
pub use engine::registry::TextureRegistry;
pub use engine::texture::{
    FrameConsumer, FrameProducer, FrameTexture, LifecycleState, PresentationPump, TextureConfig,
};
