//! ### English
//! Error taxonomy for the frame relay.
//!
//! Every variant is recoverable at the call site; none of them is allowed to take the host
//! process down.
//!
//! ### 中文
//! 帧中继的错误分类。
//!
//! 所有错误都可以在调用点恢复；任何一种都不应导致宿主进程退出。

/// Convenience result type used across the relay.
pub type FrameResult<T> = Result<T, FrameError>;

/// ### English
/// Errors surfaced by texture creation, the producer path and host registration.
///
/// ### 中文
/// 纹理创建、生产者路径与宿主注册过程中产生的错误。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// ### English
    /// The buffer pool (or one of its buffers) could not be created.
    ///
    /// ### 中文
    /// 缓冲池（或其中某个缓冲区）创建失败。
    #[error("allocation failed for {buffers} x {width}x{height} buffers: {reason}")]
    AllocationFailed {
        width: u32,
        height: u32,
        buffers: usize,
        reason: String,
    },

    /// ### English
    /// The texture was disposed (or never became active).
    ///
    /// ### 中文
    /// 纹理已销毁（或从未进入 active 状态）。
    #[error("texture is not active")]
    NotActive,

    /// ### English
    /// The producer-side backend failed while filling a buffer; the frame was dropped.
    ///
    /// ### 中文
    /// 生产者侧后端填充缓冲区失败；该帧已被丢弃。
    #[error("frame copy failed: {0}")]
    CopyFailed(String),

    /// ### English
    /// The host refused the texture or the periodic signal could not be started.
    ///
    /// ### 中文
    /// 宿主拒绝注册纹理，或周期信号无法启动。
    #[error("registration failed: {0}")]
    Registration(String),
}

impl FrameError {
    /// Build a [`FrameError::AllocationFailed`] value.
    pub fn allocation(width: u32, height: u32, buffers: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            width,
            height,
            buffers,
            reason: reason.into(),
        }
    }

    /// Build a [`FrameError::CopyFailed`] value.
    pub fn copy_failed(msg: impl Into<String>) -> Self {
        Self::CopyFailed(msg.into())
    }

    /// Build a [`FrameError::Registration`] value.
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }
}
