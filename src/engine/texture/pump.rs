//! ### English
//! Presentation pump: turns dirty frames into at most one host notification per redraw
//! opportunity.
//!
//! ### 中文
//! 呈现泵：将脏帧转换为每个重绘时机最多一次的宿主通知。

use std::sync::{Arc, Weak};

use tracing::trace;

use crate::engine::frame::SharedFrameState;

use super::TextureShared;

/// ### English
/// Per-tick coalescing step for one texture.
///
/// Holds only weak references; once the texture is disposed every tick is a no-op.
///
/// ### 中文
/// 单个纹理的逐 tick 合并步骤。
///
/// 仅持有弱引用；纹理销毁后每次 tick 都是空操作。
#[derive(Clone)]
pub struct PresentationPump {
    frames: Weak<SharedFrameState>,
    shared: Weak<TextureShared>,
}

impl PresentationPump {
    pub(crate) fn new(frames: Weak<SharedFrameState>, shared: Weak<TextureShared>) -> Self {
        Self { frames, shared }
    }

    /// ### English
    /// Handles one redraw opportunity. Returns `true` if a notification was handed off.
    ///
    /// An idle tick (nothing committed since the last hand-off) only performs a relaxed load.
    /// While a notification is still in flight the dirty flag is put back, so the next tick
    /// retries and a commit landing after the in-flight notification's read is never lost.
    ///
    /// ### 中文
    /// 处理一次重绘时机。若交接了一次通知则返回 `true`。
    ///
    /// 空闲 tick（自上次交接以来没有新的 commit）只执行一次 relaxed 读取。
    /// 若仍有通知在途，则将 dirty 标记放回，使下一次 tick 重试，
    /// 从而保证在途通知读取之后落地的 commit 永远不会丢失。
    pub fn tick(&self) -> bool {
        let Some(frames) = self.frames.upgrade() else {
            return false;
        };
        if !frames.is_dirty_relaxed() || !frames.take_dirty() {
            return false;
        }

        if !frames.try_schedule_notify() {
            frames.mark_dirty();
            trace!("notification in flight; coalescing tick");
            return false;
        }

        let Some(shared) = self.shared.upgrade() else {
            frames.finish_notify();
            return false;
        };

        let epoch = shared.delivery.epoch();
        let task_shared = Arc::downgrade(&shared);
        let task_frames = self.frames.clone();
        shared
            .dispatcher
            .dispatch(Box::new(move || deliver(task_shared, task_frames, epoch)));
        true
    }
}

/// ### English
/// UI-side half of a hand-off: notify the host unless the texture was disposed since scheduling,
/// then allow the next notification.
///
/// ### 中文
/// 交接的 UI 侧部分：若调度后纹理未被销毁则通知宿主，然后允许下一次通知。
fn deliver(shared: Weak<TextureShared>, frames: Weak<SharedFrameState>, epoch: u64) {
    if let Some(shared) = shared.upgrade()
        && let Some(_guard) = shared.delivery.enter(epoch)
    {
        shared.host.frame_available(shared.texture_id);
    }

    if let Some(frames) = frames.upgrade() {
        frames.finish_notify();
    }
}
