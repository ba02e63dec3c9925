//! ### English
//! C ABI bindings for texture lifecycle (create/destroy/tick/drain).
//!
//! ### 中文
//! 纹理生命周期相关的 C ABI 绑定（create/destroy/tick/drain）。

use std::cell::UnsafeCell;
use std::sync::Arc;

use tracing::debug;

use super::{CallbackHost, FrameRelayHostCallbacks, FrameRelayTexture, shared_scheduler};
use crate::engine::dispatch::{InlineDispatcher, UiDispatcher, UiTaskQueue};
use crate::engine::flags::FRAME_RELAY_TEXTURE_FLAG_INLINE_NOTIFY;
use crate::engine::frame::PixelFormat;
use crate::engine::refresh::{ExternalVsync, FixedIntervalTicks, RefreshMode, TickSource};
use crate::engine::texture::{FrameTexture, TextureConfig};

#[unsafe(no_mangle)]
/// ### English
/// Creates a texture, registers it with the host and starts ticking it.
///
/// - `format`: `0` = BGRA8888, `1` = RGBA8888.
/// - `buffer_count`: `2..=8` (`0` means 2).
/// - `target_fps`: `0` means external vsync (drive it with `frame_relay_texture_tick`);
///   otherwise the texture is ticked at that rate on a shared scheduler thread.
/// - `flags`: `FRAME_RELAY_TEXTURE_FLAG_*` bitmask.
///
/// Returns NULL on failure (invalid arguments, allocation failure, host refusal); nothing is left
/// registered in that case.
///
/// ### 中文
/// 创建纹理、向宿主注册并开始 tick。
///
/// - `format`：`0` = BGRA8888，`1` = RGBA8888。
/// - `buffer_count`：`2..=8`（`0` 表示 2）。
/// - `target_fps`：`0` 表示外部 vsync（通过 `frame_relay_texture_tick` 驱动）；
///   否则在共享调度线程上以该频率 tick。
/// - `flags`：`FRAME_RELAY_TEXTURE_FLAG_*` 位掩码。
///
/// 失败时（参数非法、分配失败、宿主拒绝）返回 NULL；此时不会残留任何注册。
pub unsafe extern "C" fn frame_relay_texture_create(
    callbacks: *const FrameRelayHostCallbacks,
    width: u32,
    height: u32,
    format: u32,
    buffer_count: u32,
    target_fps: u32,
    flags: u32,
) -> *mut FrameRelayTexture {
    if callbacks.is_null() {
        return std::ptr::null_mut();
    }
    let Some(format) = PixelFormat::from_raw(format) else {
        debug!(format, "unknown pixel format");
        return std::ptr::null_mut();
    };

    let host = Arc::new(CallbackHost {
        callbacks: unsafe { *callbacks },
    });
    let mut config = TextureConfig::new(width, height).with_format(format);
    if buffer_count != 0 {
        config = config.with_buffer_count(buffer_count as usize);
    }

    let mut vsync = None;
    let ticks: Arc<dyn TickSource> = match RefreshMode::from_target_fps(target_fps) {
        RefreshMode::ExternalVsync => {
            let source = Arc::new(ExternalVsync::new());
            vsync = Some(source.clone());
            source
        }
        RefreshMode::FixedInterval { fps } => {
            let Ok(scheduler) = shared_scheduler() else {
                return std::ptr::null_mut();
            };
            Arc::new(FixedIntervalTicks::new(scheduler, fps))
        }
    };

    let mut ui_queue = None;
    let dispatcher: Arc<dyn UiDispatcher> = if flags & FRAME_RELAY_TEXTURE_FLAG_INLINE_NOTIFY != 0 {
        Arc::new(InlineDispatcher)
    } else {
        let queue = Arc::new(UiTaskQueue::new());
        ui_queue = Some(queue.clone());
        queue
    };

    let Ok(texture) = FrameTexture::create(config, host, ticks, dispatcher) else {
        return std::ptr::null_mut();
    };
    let producer = UnsafeCell::new(texture.take_producer());
    let consumer = texture.consumer();

    Box::into_raw(Box::new(FrameRelayTexture {
        texture,
        producer,
        consumer,
        vsync,
        ui_queue,
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Disposes a texture created by `frame_relay_texture_create` and frees the handle.
///
/// Unregisters the texture from the host before returning. May be called from inside the host's
/// `frame_available` callback.
///
/// ### 中文
/// 销毁由 `frame_relay_texture_create` 创建的纹理并释放句柄。
///
/// 返回前会从宿主注销纹理。可以在宿主的 `frame_available` 回调内部调用。
pub unsafe extern "C" fn frame_relay_texture_destroy(texture: *mut FrameRelayTexture) {
    if texture.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(texture));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the host texture id, or `-1` for NULL.
///
/// ### 中文
/// 返回宿主纹理 id；NULL 时返回 `-1`。
pub unsafe extern "C" fn frame_relay_texture_id(texture: *const FrameRelayTexture) -> i64 {
    if texture.is_null() {
        return -1;
    }
    unsafe { (*texture).texture.texture_id().0 }
}

#[unsafe(no_mangle)]
/// ### English
/// Signals one redraw opportunity (external-vsync textures only; no-op otherwise).
///
/// ### 中文
/// 发出一次重绘时机信号（仅对外部 vsync 纹理有效；否则为空操作）。
pub unsafe extern "C" fn frame_relay_texture_tick(texture: *const FrameRelayTexture) {
    if texture.is_null() {
        return;
    }
    if let Some(vsync) = unsafe { (*texture).vsync.as_ref() } {
        vsync.signal();
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Runs pending "frame available" notifications on the calling (UI) thread.
///
/// Returns the number of notifications processed (always 0 for inline-notify textures).
///
/// ### 中文
/// 在调用方（UI）线程上执行待处理的 “帧可用” 通知。
///
/// 返回处理的通知数量（内联通知的纹理总是返回 0）。
pub unsafe extern "C" fn frame_relay_texture_drain_ui(texture: *const FrameRelayTexture) -> u32 {
    if texture.is_null() {
        return 0;
    }
    unsafe { (*texture).ui_queue.as_ref() }.map_or(0, |queue| queue.drain() as u32)
}
