//! ### English
//! Epoch-tagged gate that lets teardown invalidate and drain deferred work.
//!
//! Deferred work (a tick, a UI hand-off) captures the epoch when it is scheduled and must `enter`
//! the gate with it before touching the host. `close` advances the epoch, so every later `enter`
//! fails, then waits until work that already entered has left.
//!
//! `enter` publishes `in_flight` before re-reading the epoch and `close` publishes the epoch before
//! reading `in_flight` (both `SeqCst`), so at least one side sees the other.
//!
//! ### 中文
//! 带 epoch 标记的闸门，用于销毁时使延迟任务失效并等待其排空。
//!
//! 延迟任务（tick、UI 交接）在调度时捕获 epoch，访问宿主前必须用它 `enter` 闸门。
//! `close` 推进 epoch，使之后的 `enter` 全部失败，然后等待已进入的任务离开。
//!
//! `enter` 先发布 `in_flight` 再重读 epoch，`close` 先发布 epoch 再读取 `in_flight`（均为 `SeqCst`），
//! 因此两侧至少有一方能看到对方。

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::Backoff;

thread_local! {
    /// ### English
    /// Gates the current thread is inside of (by address), innermost last.
    ///
    /// ### 中文
    /// 当前线程所在的闸门（按地址），最内层在末尾。
    static ENTERED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

pub(crate) struct EpochGate {
    epoch: AtomicU64,
    in_flight: AtomicUsize,
}

impl EpochGate {
    pub(crate) fn new() -> Self {
        Self {
            epoch: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// ### English
    /// Current epoch, captured by work at schedule time.
    ///
    /// ### 中文
    /// 当前 epoch，由任务在调度时捕获。
    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn is_closed(&self, epoch: u64) -> bool {
        self.epoch() != epoch
    }

    /// ### English
    /// Enters the gate if it is still at `epoch`.
    ///
    /// #### Parameters
    /// - `epoch`: Epoch captured when the work was scheduled.
    ///
    /// ### 中文
    /// 若闸门仍处于 `epoch`，则进入闸门。
    ///
    /// #### 参数
    /// - `epoch`：任务调度时捕获的 epoch。
    pub(crate) fn enter(&self, epoch: u64) -> Option<GateGuard<'_>> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return None;
        }

        ENTERED.with(|entered| entered.borrow_mut().push(self.addr()));
        Some(GateGuard { gate: self })
    }

    /// ### English
    /// Advances the epoch and waits for entered work to leave.
    ///
    /// Work entered by the calling thread itself is not waited for (teardown from inside a tick or
    /// a host notification). Returns `true` when the gate was fully drained.
    ///
    /// ### 中文
    /// 推进 epoch 并等待已进入的任务离开。
    ///
    /// 不会等待调用线程自身已进入的任务（在 tick 或宿主通知内部触发销毁）。
    /// 完全排空时返回 `true`。
    pub(crate) fn close(&self) -> bool {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let own = self.entered_on_current_thread();
        let mut backoff = Backoff::new();
        while self.in_flight.load(Ordering::SeqCst) > own {
            backoff.snooze();
        }
        own == 0
    }

    /// ### English
    /// Whether the calling thread is currently inside this gate.
    ///
    /// ### 中文
    /// 调用线程当前是否位于该闸门内。
    #[cfg(test)]
    pub(crate) fn is_entered_on_current_thread(&self) -> bool {
        self.entered_on_current_thread() > 0
    }

    fn entered_on_current_thread(&self) -> usize {
        let addr = self.addr();
        ENTERED.with(|entered| entered.borrow().iter().filter(|&&a| a == addr).count())
    }

    #[inline]
    fn addr(&self) -> usize {
        self as *const Self as usize
    }
}

impl Default for EpochGate {
    fn default() -> Self {
        Self::new()
    }
}

/// ### English
/// Proof of being inside an `EpochGate`; leaving happens on drop.
///
/// ### 中文
/// 位于 `EpochGate` 内的凭证；drop 时离开闸门。
pub(crate) struct GateGuard<'g> {
    gate: &'g EpochGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let addr = self.gate.addr();
        ENTERED.with(|entered| {
            let mut entered = entered.borrow_mut();
            if let Some(pos) = entered.iter().rposition(|&a| a == addr) {
                entered.remove(pos);
            }
        });
        self.gate.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn enter_fails_after_close() {
        let gate = EpochGate::new();
        let epoch = gate.epoch();
        assert!(gate.enter(epoch).is_some());
        assert!(gate.close());
        assert!(gate.is_closed(epoch));
        assert!(gate.enter(epoch).is_none());
    }

    #[test]
    fn reentrant_close_does_not_wait_for_itself() {
        let gate = EpochGate::new();
        let guard = gate.enter(gate.epoch());
        assert!(guard.is_some());
        assert!(gate.is_entered_on_current_thread());
        assert!(!gate.close());
        drop(guard);
        assert!(!gate.is_entered_on_current_thread());
    }

    #[test]
    fn close_waits_for_work_on_other_threads() {
        let gate = Arc::new(EpochGate::new());
        let finished = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = mpsc::channel();

        let worker = {
            let gate = gate.clone();
            let finished = finished.clone();
            thread::spawn(move || {
                let _guard = gate.enter(gate.epoch());
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(30));
                finished.store(true, Ordering::SeqCst);
            })
        };

        entered_rx.recv().unwrap();
        assert!(gate.close());
        assert!(finished.load(Ordering::SeqCst));
        worker.join().unwrap();
    }
}
