//! ### English
//! One presentable texture: the frame pool, its producer and consumer endpoints, the presentation
//! pump and the create/dispose lifecycle tying them to a host.
//!
//! ### 中文
//! 单个可呈现纹理：帧缓冲池、生产者与消费者端点、呈现泵，以及将它们与宿主绑定的创建/销毁生命周期。
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use dpi::PhysicalSize;

use crate::engine::dispatch::UiDispatcher;
use crate::engine::frame::{FrameLayout, MIN_BUFFER_COUNT, PixelFormat, SharedFrameState};
use crate::engine::host::{TextureHost, TextureId};
use crate::engine::lockfree::EpochGate;
use crate::engine::refresh::TickSource;

mod consumer;
mod init;
mod producer;
mod pump;
mod teardown;

pub use consumer::FrameConsumer;
pub use producer::FrameProducer;
pub use pump::PresentationPump;

/// ### English
/// Creation parameters of a texture. Fixed for the texture's whole life.
///
/// ### 中文
/// 纹理的创建参数。在纹理整个生命周期内固定不变。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureConfig {
    pub size: PhysicalSize<u32>,
    pub format: PixelFormat,
    /// ### English
    /// Number of pool buffers (`2..=8`; 2 is classic double buffering).
    ///
    /// ### 中文
    /// 缓冲池缓冲区数量（`2..=8`；2 即经典双缓冲）。
    pub buffer_count: usize,
}

impl TextureConfig {
    /// ### English
    /// BGRA8888, double-buffered.
    ///
    /// ### 中文
    /// BGRA8888，双缓冲。
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: PhysicalSize::new(width, height),
            format: PixelFormat::default(),
            buffer_count: MIN_BUFFER_COUNT,
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_buffer_count(mut self, buffer_count: usize) -> Self {
        self.buffer_count = buffer_count;
        self
    }
}

/// ### English
/// Lifecycle of a texture. `Disposed` is terminal.
///
/// ### 中文
/// 纹理的生命周期。`Disposed` 为终态。
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized = 0,
    Active = 1,
    Disposed = 2,
}

impl LifecycleState {
    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Active,
            2 => Self::Disposed,
            _ => Self::Uninitialized,
        }
    }
}

/// ### English
/// Host-facing half of a texture, shared with the pump and its deferred hand-offs.
///
/// ### 中文
/// 纹理面向宿主的部分，由呈现泵及其延迟交接任务共享。
pub(crate) struct TextureShared {
    host: Arc<dyn TextureHost>,
    dispatcher: Arc<dyn UiDispatcher>,
    texture_id: TextureId,
    /// ### English
    /// Delivery gate: hand-offs capture its epoch when scheduled; dispose closes it.
    ///
    /// ### 中文
    /// 投递闸门：交接任务在调度时捕获其 epoch；dispose 时关闭。
    delivery: EpochGate,
    state: AtomicU8,
}

impl TextureShared {
    #[inline]
    fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// ### English
/// A live texture registered with a host.
///
/// Created `Active` by `FrameTexture::create`; `dispose` (or drop) tears it down. The producer
/// endpoint can be taken once; consumer endpoints and pumps can be cloned freely and become inert
/// after dispose.
///
/// ### 中文
/// 已注册到宿主的活动纹理。
///
/// 由 `FrameTexture::create` 以 `Active` 状态创建；`dispose`（或 drop）负责销毁。
/// 生产者端点只能取出一次；消费者端点与呈现泵可自由克隆，dispose 后变为无效。
pub struct FrameTexture {
    /// ### English
    /// Manager's ownership of the pool; `None` once disposed.
    ///
    /// ### 中文
    /// 管理者对缓冲池的所有权；dispose 后为 `None`。
    frames: Option<Arc<SharedFrameState>>,
    shared: Arc<TextureShared>,
    ticks: Arc<dyn TickSource>,
    layout: FrameLayout,
    producer_taken: AtomicBool,
}

impl FrameTexture {
    #[inline]
    pub fn texture_id(&self) -> TextureId {
        self.shared.texture_id
    }

    #[inline]
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// ### English
    /// Takes the single producer endpoint. `None` if already taken or disposed.
    ///
    /// ### 中文
    /// 取出唯一的生产者端点。若已被取出或已销毁则返回 `None`。
    pub fn take_producer(&self) -> Option<FrameProducer> {
        let frames = self.frames.as_ref()?;
        if self.producer_taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(FrameProducer::new(Arc::downgrade(frames)))
    }

    /// ### English
    /// A consumer endpoint (callable from any thread, any number of them).
    ///
    /// ### 中文
    /// 一个消费者端点（可在任意线程使用，数量不限）。
    pub fn consumer(&self) -> FrameConsumer {
        FrameConsumer::new(self.frames.as_ref().map(Arc::downgrade).unwrap_or_default())
    }

    /// ### English
    /// A pump bound to this texture, for hosts that drive ticks manually.
    ///
    /// ### 中文
    /// 绑定到该纹理的呈现泵，供手动驱动 tick 的宿主使用。
    pub fn pump(&self) -> PresentationPump {
        PresentationPump::new(
            self.frames.as_ref().map(Arc::downgrade).unwrap_or_default(),
            Arc::downgrade(&self.shared),
        )
    }
}

impl Drop for FrameTexture {
    fn drop(&mut self) {
        self.dispose();
    }
}
