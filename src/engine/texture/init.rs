use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8};

use tracing::debug;

use crate::engine::dispatch::UiDispatcher;
use crate::engine::error::FrameResult;
use crate::engine::frame::{FrameBufferPool, SharedFrameState};
use crate::engine::host::TextureHost;
use crate::engine::lockfree::EpochGate;
use crate::engine::refresh::TickSource;

use super::{FrameTexture, LifecycleState, PresentationPump, TextureConfig, TextureShared};

impl FrameTexture {
    /// ### English
    /// Allocates the pool, registers the texture with the host and starts the periodic signal.
    ///
    /// On failure everything acquired so far is rolled back (the host registration is undone and
    /// the pool freed) and no texture exists.
    ///
    /// #### Parameters
    /// - `config`: Fixed size, format and buffer count.
    /// - `host`: Host receiving the registration and "frame available" notifications.
    /// - `ticks`: Periodic redraw-opportunity source driving the pump; started here, stopped on
    ///   dispose.
    /// - `dispatcher`: Hand-off into the host UI execution context.
    ///
    /// ### 中文
    /// 分配缓冲池、向宿主注册纹理并启动周期信号。
    ///
    /// 失败时会回滚已获取的全部资源（撤销宿主注册并释放缓冲池），不会留下任何纹理实例。
    ///
    /// #### 参数
    /// - `config`：固定的尺寸、格式与缓冲区数量。
    /// - `host`：接收注册与 “帧可用” 通知的宿主。
    /// - `ticks`：驱动呈现泵的周期性重绘信号源；在此启动，dispose 时停止。
    /// - `dispatcher`：交接到宿主 UI 执行上下文的调度器。
    #[tracing::instrument(
        level = "debug",
        skip(host, ticks, dispatcher),
        fields(width = config.size.width, height = config.size.height)
    )]
    pub fn create(
        config: TextureConfig,
        host: Arc<dyn TextureHost>,
        ticks: Arc<dyn TickSource>,
        dispatcher: Arc<dyn UiDispatcher>,
    ) -> FrameResult<Self> {
        let pool = FrameBufferPool::new(config.size, config.format, config.buffer_count)
            .inspect_err(|err| debug!(%err, "frame pool allocation failed"))?;
        let layout = pool.layout();
        let frames = Arc::new(SharedFrameState::new(pool));

        let texture_id = host
            .register_texture(&layout)
            .inspect_err(|err| debug!(%err, "host refused texture registration"))?;
        debug!(%texture_id, "texture registered");

        let shared = Arc::new(TextureShared {
            host,
            dispatcher,
            texture_id,
            delivery: EpochGate::new(),
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
        });

        let pump = PresentationPump::new(Arc::downgrade(&frames), Arc::downgrade(&shared));
        if let Err(err) = ticks.start(Arc::new(move || {
            pump.tick();
        })) {
            debug!(%err, "periodic signal failed to start; rolling back");
            shared.host.unregister_texture(texture_id);
            return Err(err);
        }

        shared.set_state(LifecycleState::Active);
        Ok(Self {
            frames: Some(frames),
            shared,
            ticks,
            layout,
            producer_taken: AtomicBool::new(false),
        })
    }
}
