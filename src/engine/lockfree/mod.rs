//! ### English
//! Lock-free primitives shared across the relay.
//!
//! Hot paths only touch atomics; waiting happens exclusively on cold teardown paths.
//!
//! ### 中文
//! 中继内部复用的无锁原语。
//!
//! 热路径只访问原子变量；等待只发生在冷路径（销毁）上。
mod backoff;
mod epoch;

pub(crate) use backoff::Backoff;
pub(crate) use epoch::EpochGate;
