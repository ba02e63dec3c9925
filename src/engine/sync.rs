//! ### English
//! Atomic types used by the ready-state protocol.
//!
//! Under `--features loom` (test builds only) these resolve to loom's model-checked atomics.
//!
//! ### 中文
//! 就绪状态协议使用的原子类型。
//!
//! 在 `--features loom` 的测试构建中，这些类型替换为 loom 的可模型检查原子类型。

#[cfg(all(feature = "loom", test))]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, fence};
#[cfg(not(all(feature = "loom", test)))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, fence};
