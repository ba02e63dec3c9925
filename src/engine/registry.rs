//! ### English
//! Textures keyed by a caller-chosen `u32` id.
//!
//! Lookups, creation and destruction go through a short critical section; pixel copies and
//! teardown run outside of it. Teardown always completes on the thread that removed the entry,
//! even if another thread still holds the entry for an in-flight `update`.
//!
//! ### 中文
//! 以调用方选定的 `u32` id 为键的纹理表。
//!
//! 查找、创建与销毁只在很短的临界区内进行；像素复制与销毁过程在临界区之外执行。
//! 销毁总是在移除条目的线程上完成，即使其它线程仍因进行中的 `update` 持有该条目。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::dispatch::UiDispatcher;
use super::error::{FrameError, FrameResult};
use super::host::{TextureHost, TextureId};
use super::refresh::TickSource;
use super::texture::{FrameConsumer, FrameProducer, FrameTexture, TextureConfig};

struct RegisteredTexture {
    texture_id: TextureId,
    consumer: FrameConsumer,
    texture: Mutex<Option<FrameTexture>>,
    producer: Mutex<Option<FrameProducer>>,
}

impl RegisteredTexture {
    fn new(texture: FrameTexture) -> Self {
        Self {
            texture_id: texture.texture_id(),
            consumer: texture.consumer(),
            producer: Mutex::new(texture.take_producer()),
            texture: Mutex::new(Some(texture)),
        }
    }

    /// Disposes the texture now, whoever else still holds this entry.
    fn retire(&self) {
        let texture = self
            .texture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut texture) = texture {
            texture.dispose();
        }
    }
}

/// ### English
/// Registry of textures sharing one host and one UI dispatcher.
///
/// ### 中文
/// 共享同一宿主与 UI 调度器的纹理注册表。
pub struct TextureRegistry {
    host: Arc<dyn TextureHost>,
    dispatcher: Arc<dyn UiDispatcher>,
    textures: Mutex<HashMap<u32, Arc<RegisteredTexture>>>,
}

impl TextureRegistry {
    pub fn new(host: Arc<dyn TextureHost>, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            host,
            dispatcher,
            textures: Mutex::new(HashMap::new()),
        }
    }

    /// ### English
    /// Creates texture `id`, replacing (and disposing) any texture already registered under it.
    ///
    /// If creation fails the id is left empty, even if it held a texture before.
    ///
    /// #### Parameters
    /// - `id`: Caller-chosen key.
    /// - `config`: Texture size, format and buffer count.
    /// - `ticks`: Periodic signal dedicated to this texture.
    ///
    /// ### 中文
    /// 创建纹理 `id`，并替换（销毁）该 id 下已有的纹理。
    ///
    /// 若创建失败，该 id 将保持为空（即使之前存在纹理）。
    ///
    /// #### 参数
    /// - `id`：调用方选定的键。
    /// - `config`：纹理尺寸、格式与缓冲区数量。
    /// - `ticks`：该纹理专用的周期信号源。
    pub fn create(
        &self,
        id: u32,
        config: TextureConfig,
        ticks: Arc<dyn TickSource>,
    ) -> FrameResult<TextureId> {
        let previous = self.lock().remove(&id);
        if let Some(previous) = previous {
            debug!(id, "replacing registered texture");
            previous.retire();
        }

        let texture = FrameTexture::create(
            config,
            self.host.clone(),
            ticks,
            self.dispatcher.clone(),
        )?;
        let entry = Arc::new(RegisteredTexture::new(texture));
        let texture_id = entry.texture_id;

        // A concurrent create for the same id may have won the race; the loser is disposed here.
        let replaced = self.lock().insert(id, entry);
        if let Some(replaced) = replaced {
            replaced.retire();
        }
        Ok(texture_id)
    }

    /// ### English
    /// Disposes texture `id`. Returns `false` if no such texture exists.
    ///
    /// The texture is unregistered from the host before this returns; a concurrent `update` either
    /// lands before that or fails with `NotActive`.
    ///
    /// ### 中文
    /// 销毁纹理 `id`。若不存在该纹理则返回 `false`。
    ///
    /// 返回前纹理已从宿主注销；并发的 `update` 要么在此之前完成，要么以 `NotActive` 失败。
    pub fn destroy(&self, id: u32) -> bool {
        let removed = self.lock().remove(&id);
        match removed {
            Some(entry) => {
                entry.retire();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn texture_id(&self, id: u32) -> Option<TextureId> {
        self.get(id).map(|entry| entry.texture_id)
    }

    pub fn consumer(&self, id: u32) -> Option<FrameConsumer> {
        self.get(id).map(|entry| entry.consumer.clone())
    }

    /// ### English
    /// Copies a host frame into texture `id` and commits it.
    ///
    /// Fails with `NotActive` for an unknown or destroyed id. Returns `Ok(None)` if the frame was
    /// dropped.
    ///
    /// This is a convenience path that takes the registry lock and a per-texture lock on every
    /// call. Producers that need the lock-free path should take a `FrameProducer` from a
    /// `FrameTexture` directly.
    ///
    /// ### 中文
    /// 将宿主帧复制到纹理 `id` 并提交。
    ///
    /// id 不存在或已销毁时返回 `NotActive`。若该帧被丢弃则返回 `Ok(None)`。
    ///
    /// 这是便捷路径，每次调用都会获取注册表锁与单个纹理的锁。
    /// 需要无锁路径的生产者应直接从 `FrameTexture` 取得 `FrameProducer`。
    pub fn update(&self, id: u32, src: &[u8], src_stride: usize) -> FrameResult<Option<u64>> {
        let entry = self.get(id).ok_or(FrameError::NotActive)?;
        let mut producer = entry
            .producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let producer = producer.as_mut().ok_or(FrameError::NotActive)?;
        producer.write_frame(src, src_stride)
    }

    /// ### English
    /// Copies the latest frame of texture `id` into host memory; 0 if unknown or empty.
    ///
    /// ### 中文
    /// 将纹理 `id` 的最新帧复制到宿主内存；id 不存在或无帧时返回 0。
    pub fn copy(&self, id: u32, dst: &mut [u8], dst_stride: usize) -> usize {
        self.consumer(id)
            .map_or(0, |consumer| consumer.copy_current_into(dst, dst_stride))
    }

    /// ### English
    /// Disposes every texture.
    ///
    /// ### 中文
    /// 销毁所有纹理。
    pub fn clear(&self) {
        let drained: Vec<_> = self.lock().drain().map(|(_, entry)| entry).collect();
        for entry in drained {
            entry.retire();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get(&self, id: u32) -> Option<Arc<RegisteredTexture>> {
        self.lock().get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, Arc<RegisteredTexture>>> {
        self.textures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TextureRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
