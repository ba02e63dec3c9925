//! ### English
//! Bitflags controlling optional texture behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制纹理可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Deliver "frame available" notifications directly on the tick thread instead of queueing them
/// for `frame_relay_texture_drain_ui`.
///
/// Only use this when the host's notification entry point is itself thread-safe (e.g. a Flutter
/// texture registrar's `MarkTextureFrameAvailable`).
///
/// ### 中文
/// 直接在 tick 线程上投递 “帧可用” 通知，而不是排队等待 `frame_relay_texture_drain_ui`。
///
/// 仅当宿主的通知入口本身线程安全时使用（例如 Flutter 纹理注册器的
/// `MarkTextureFrameAvailable`）。
pub const FRAME_RELAY_TEXTURE_FLAG_INLINE_NOTIFY: u32 = 1 << 0;
