//! ### English
//! Hand-off of notification work to the host's UI execution context.
//!
//! ### 中文
//! 将通知任务交接到宿主 UI 执行上下文。

use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// ### English
/// One unit of work to run on the UI execution context.
///
/// ### 中文
/// 在 UI 执行上下文中运行的单个任务。
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// ### English
/// Schedules work on the host UI execution context. Must never block the caller.
///
/// ### 中文
/// 将任务调度到宿主 UI 执行上下文。不得阻塞调用方。
pub trait UiDispatcher: Send + Sync + 'static {
    fn dispatch(&self, task: UiTask);
}

/// ### English
/// Runs tasks immediately on the calling thread (the tick thread).
///
/// ### 中文
/// 直接在调用线程（tick 线程）上运行任务。
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineDispatcher;

impl UiDispatcher for InlineDispatcher {
    #[inline]
    fn dispatch(&self, task: UiTask) {
        task();
    }
}

/// ### English
/// Unbounded task queue drained by the host on its UI thread.
///
/// `dispatch` may be called from any thread; `drain` runs queued tasks on the caller's thread.
/// Coalescing in the pump bounds the queue to one pending notification per texture.
///
/// ### 中文
/// 由宿主在 UI 线程上 drain 的无界任务队列。
///
/// `dispatch` 可在任意线程调用；`drain` 在调用方线程上执行已排队的任务。
/// 呈现泵的合并机制保证每个纹理最多只有一个待处理通知。
pub struct UiTaskQueue {
    tx: Sender<UiTask>,
    rx: Receiver<UiTask>,
}

impl UiTaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// ### English
    /// Runs every task queued before this call returns; returns how many ran.
    ///
    /// Tasks queued by a running task are picked up in the same drain.
    ///
    /// ### 中文
    /// 执行所有已排队的任务，返回执行数量。
    ///
    /// 任务执行期间新排队的任务会在同一次 drain 中被处理。
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return ran,
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for UiTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatcher for UiTaskQueue {
    fn dispatch(&self, task: UiTask) {
        // The queue owns its receiver, so the channel never disconnects while `self` lives.
        let _ = self.tx.send(task);
    }
}
