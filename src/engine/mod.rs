/// ### English
/// Engine internal modules (frame storage, ready-state publishing, presentation pump, lifecycle).
///
/// ### 中文
/// 引擎内部模块（帧存储、就绪状态发布、呈现泵、生命周期）。
pub(crate) mod cache;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod frame;
pub mod host;
pub(crate) mod lockfree;
pub mod refresh;
pub mod registry;
pub(crate) mod sync;
pub mod texture;
