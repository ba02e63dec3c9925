//! ### English
//! C ABI surface for `frame_relay`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`. Every function
//! tolerates NULL handles (returns 0 / does nothing).
//!
//! ### 中文
//! `frame_relay` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 所有函数都容忍 NULL 句柄（返回 0 / 不做任何事）。
mod abi;
mod frame;
mod texture;

use std::cell::UnsafeCell;
use std::ffi::c_void;
use std::sync::{Arc, OnceLock};

use crate::engine::dispatch::UiTaskQueue;
use crate::engine::error::{FrameError, FrameResult};
use crate::engine::frame::{FrameInfo, FrameLayout};
use crate::engine::host::{TextureHost, TextureId};
use crate::engine::refresh::{ExternalVsync, RefreshScheduler};
use crate::engine::texture::{FrameConsumer, FrameProducer, FrameTexture};

/// ### English
/// C ABI version for `frame_relay`.
///
/// ### 中文
/// `frame_relay` 的 C ABI 版本号。
const FRAME_RELAY_ABI_VERSION: u32 = 1;

/// ### English
/// Registers a texture; returns the host texture id, or a negative value to refuse.
///
/// ### 中文
/// 注册纹理；返回宿主纹理 id，返回负值表示拒绝。
pub type FrameRelayRegisterFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    width: u32,
    height: u32,
    stride: u32,
    format: u32,
) -> i64;

pub type FrameRelayTextureFn = unsafe extern "C" fn(user_data: *mut c_void, texture_id: i64);

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Host callbacks used by a texture created through the C ABI.
///
/// `user_data` is passed back verbatim. `register_texture` / `unregister_texture` run on the thread
/// calling create / destroy. `frame_available` runs on the tick thread when the texture was created
/// with `FRAME_RELAY_TEXTURE_FLAG_INLINE_NOTIFY`, otherwise inside
/// `frame_relay_texture_drain_ui`. The callbacks (and `user_data`) must be usable from those
/// threads.
///
/// ### 中文
/// 通过 C ABI 创建的纹理所使用的宿主回调。
///
/// `user_data` 会原样传回。`register_texture` / `unregister_texture` 在调用 create / destroy 的线程上运行。
/// 若创建时指定了 `FRAME_RELAY_TEXTURE_FLAG_INLINE_NOTIFY`，`frame_available` 在 tick 线程上运行，
/// 否则在 `frame_relay_texture_drain_ui` 内运行。回调（以及 `user_data`）必须能在这些线程上使用。
pub struct FrameRelayHostCallbacks {
    pub user_data: *mut c_void,
    pub register_texture: Option<FrameRelayRegisterFn>,
    pub unregister_texture: Option<FrameRelayTextureFn>,
    pub frame_available: Option<FrameRelayTextureFn>,
}

/// ### English
/// `TextureHost` backed by C callbacks.
///
/// ### 中文
/// 由 C 回调实现的 `TextureHost`。
struct CallbackHost {
    callbacks: FrameRelayHostCallbacks,
}

// The embedder guarantees the callbacks and `user_data` may be used from the threads documented
// on `FrameRelayHostCallbacks`.
unsafe impl Send for CallbackHost {}
unsafe impl Sync for CallbackHost {}

impl TextureHost for CallbackHost {
    fn register_texture(&self, layout: &FrameLayout) -> FrameResult<TextureId> {
        let Some(register) = self.callbacks.register_texture else {
            return Err(FrameError::registration("host has no register_texture callback"));
        };
        let stride = u32::try_from(layout.stride)
            .map_err(|_| FrameError::registration("row stride does not fit the C ABI"))?;

        let id = unsafe {
            register(
                self.callbacks.user_data,
                layout.width(),
                layout.height(),
                stride,
                layout.format as u32,
            )
        };
        if id < 0 {
            return Err(FrameError::registration(format!(
                "host refused texture (code {id})"
            )));
        }
        Ok(TextureId(id))
    }

    fn unregister_texture(&self, id: TextureId) {
        if let Some(unregister) = self.callbacks.unregister_texture {
            unsafe { unregister(self.callbacks.user_data, id.0) };
        }
    }

    fn frame_available(&self, id: TextureId) {
        if let Some(frame_available) = self.callbacks.frame_available {
            unsafe { frame_available(self.callbacks.user_data, id.0) };
        }
    }
}

/// ### English
/// Opaque texture handle.
///
/// Thread contract: `frame_relay_texture_update` must only be called from one thread at a time
/// (the producer thread). Every other function may be called from any thread, except `destroy`,
/// which must not race with any other call on the same handle.
///
/// ### 中文
/// 不透明纹理句柄。
///
/// 线程约定：`frame_relay_texture_update` 同一时间只能由一个线程（生产者线程）调用。
/// 其它函数可在任意线程调用；`destroy` 除外，它不得与同一句柄上的任何其它调用并发。
pub struct FrameRelayTexture {
    texture: FrameTexture,
    /// ### English
    /// Single producer, touched only by the producer thread.
    ///
    /// ### 中文
    /// 唯一的生产者，仅由生产者线程访问。
    producer: UnsafeCell<Option<FrameProducer>>,
    consumer: FrameConsumer,
    /// ### English
    /// Present in external-vsync mode (`target_fps == 0`).
    ///
    /// ### 中文
    /// 外部 vsync 模式（`target_fps == 0`）下存在。
    vsync: Option<Arc<ExternalVsync>>,
    /// ### English
    /// Present unless notifications are delivered inline.
    ///
    /// ### 中文
    /// 除非通知为内联投递，否则存在。
    ui_queue: Option<Arc<UiTaskQueue>>,
}

// `producer` is only accessed under the single-producer-thread contract above.
unsafe impl Sync for FrameRelayTexture {}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// Metadata of the latest committed frame.
///
/// ### 中文
/// 最新已提交帧的元数据。
pub struct FrameRelayFrameInfo {
    /// ### English
    /// Pool index holding the frame.
    ///
    /// ### 中文
    /// 持有该帧的缓冲池索引。
    pub buffer_index: u32,
    pub width: u32,
    pub height: u32,
    /// ### English
    /// Bytes per row.
    ///
    /// ### 中文
    /// 每行字节数。
    pub pitch: u32,
    /// ### English
    /// `0` = BGRA8888, `1` = RGBA8888.
    ///
    /// ### 中文
    /// `0` = BGRA8888，`1` = RGBA8888。
    pub format: u32,
    pub frame_seq: u64,
}

impl From<FrameInfo> for FrameRelayFrameInfo {
    fn from(value: FrameInfo) -> Self {
        Self {
            buffer_index: value.slot as u32,
            width: value.width,
            height: value.height,
            pitch: value.stride as u32,
            format: value.format as u32,
            frame_seq: value.frame_seq,
        }
    }
}

/// ### English
/// Scheduler shared by every fixed-interval texture created through the C ABI.
///
/// ### 中文
/// 通过 C ABI 创建的所有固定间隔纹理共享的调度器。
fn shared_scheduler() -> FrameResult<Arc<RefreshScheduler>> {
    static SCHEDULER: OnceLock<Arc<RefreshScheduler>> = OnceLock::new();

    if let Some(scheduler) = SCHEDULER.get() {
        return Ok(scheduler.clone());
    }
    let scheduler = RefreshScheduler::new()?;
    Ok(SCHEDULER.get_or_init(|| scheduler).clone())
}
