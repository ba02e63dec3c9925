//! ### English
//! Host-side services the relay depends on: texture registration and "content changed"
//! notifications.
//!
//! ### 中文
//! 中继所依赖的宿主侧服务：纹理注册与 “内容已变更” 通知。

use std::fmt;

use super::error::FrameResult;
use super::frame::FrameLayout;

/// ### English
/// Host-assigned texture identifier.
///
/// ### 中文
/// 宿主分配的纹理标识符。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub i64);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ### English
/// Presentation host (compositor, texture registrar, ...).
///
/// `register_texture` / `unregister_texture` are called from the thread that creates / disposes
/// the texture. `frame_available` is called on the host UI execution context chosen by the
/// texture's `UiDispatcher`, at most once per redraw opportunity; the host is expected to read the
/// frame afterwards through `FrameConsumer::copy_current`.
///
/// ### 中文
/// 呈现宿主（合成器、纹理注册器等）。
///
/// `register_texture` / `unregister_texture` 在创建 / 销毁纹理的线程上调用。
/// `frame_available` 在纹理的 `UiDispatcher` 选定的宿主 UI 执行上下文中调用，
/// 每个重绘时机最多一次；宿主随后应通过 `FrameConsumer::copy_current` 读取帧。
pub trait TextureHost: Send + Sync + 'static {
    /// ### English
    /// Registers a texture with the given fixed layout and returns its id.
    ///
    /// ### 中文
    /// 以给定的固定布局注册纹理，并返回其 id。
    fn register_texture(&self, layout: &FrameLayout) -> FrameResult<TextureId>;

    fn unregister_texture(&self, id: TextureId);

    /// ### English
    /// The latest frame of `id` changed since the previous notification.
    ///
    /// ### 中文
    /// 自上次通知以来，`id` 的最新帧已变更。
    fn frame_available(&self, id: TextureId);
}
