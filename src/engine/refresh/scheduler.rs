//! ### English
//! Shared scheduler backing fixed-interval ticks (single worker thread).
//!
//! ### 中文
//! 固定间隔 tick 的共享调度器（单工作线程）。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::engine::error::{FrameError, FrameResult};

/// ### English
/// Repeating job run on the scheduler thread; returns `false` to stop repeating.
///
/// ### 中文
/// 在调度线程上运行的重复任务；返回 `false` 表示不再重复。
pub(crate) type RepeatingJob = Box<dyn FnMut() -> bool + Send + 'static>;

/// ### English
/// One scheduled job stored in the internal priority queue.
///
/// `BinaryHeap` is a max-heap, so we reverse the ordering in `Ord` to pop the earliest deadline.
///
/// ### 中文
/// 存储在内部优先队列中的单个调度任务。
///
/// `BinaryHeap` 是最大堆，因此在 `Ord` 中反转排序以便弹出最早的 deadline。
struct ScheduledJob {
    deadline: Instant,
    /// ### English
    /// Monotonic sequence used as a tiebreaker in the heap.
    ///
    /// ### 中文
    /// 在堆中用作平局判定的单调序号。
    seq: u64,
    period: Duration,
    job: RepeatingJob,
}

impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledJob {
    /// ### English
    /// Reversed ordering so earlier deadlines have higher priority in a max-heap.
    ///
    /// ### 中文
    /// 反转排序：在最大堆中让更早的 deadline 拥有更高优先级。
    fn cmp(&self, other: &Self) -> Ordering {
        match other.deadline.cmp(&self.deadline) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

enum SchedulerMessage {
    Schedule(ScheduledJob),
    Shutdown,
}

/// ### English
/// Shared scheduler for fixed-interval ticks (avoids one timer thread per texture).
///
/// ### 中文
/// 固定间隔 tick 的共享调度器（避免每个纹理单独创建计时线程）。
pub struct RefreshScheduler {
    tx: Sender<SchedulerMessage>,
    /// ### English
    /// Monotonic job sequence generator.
    ///
    /// ### 中文
    /// 单调递增的任务序号生成器。
    next_seq: AtomicU64,
    /// ### English
    /// Scheduler thread handle (to detect drops on the scheduler thread itself).
    ///
    /// ### 中文
    /// 调度线程句柄（用于检测是否在调度线程自身上 drop）。
    thread: thread::Thread,
    join: Option<thread::JoinHandle<()>>,
}

impl RefreshScheduler {
    /// ### English
    /// Creates a scheduler backed by a single worker thread.
    ///
    /// Fails with `Registration` if the thread cannot be spawned.
    ///
    /// ### 中文
    /// 创建一个由单线程驱动的调度器。
    ///
    /// 若线程无法创建，返回 `Registration` 错误。
    pub fn new() -> FrameResult<Arc<Self>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let join = thread::Builder::new()
            .name("FrameRelayRefresh".to_string())
            .spawn(move || run_scheduler(rx))
            .map_err(|err| {
                FrameError::registration(format!("failed to spawn refresh scheduler: {err}"))
            })?;
        let thread_handle = join.thread().clone();

        Ok(Arc::new(Self {
            tx,
            next_seq: AtomicU64::new(1),
            thread: thread_handle,
            join: Some(join),
        }))
    }

    /// ### English
    /// Runs `job` every `period`, first after one period, until it returns `false`.
    ///
    /// Late ticks are not replayed: if the scheduler falls more than a period behind, the next
    /// deadline is re-anchored to now.
    ///
    /// #### Parameters
    /// - `period`: Interval between runs.
    /// - `job`: Job executed on the scheduler thread.
    ///
    /// ### 中文
    /// 每隔 `period` 运行一次 `job`（首次在一个周期后），直到其返回 `false`。
    ///
    /// 迟到的 tick 不会补发：若调度落后超过一个周期，下一次 deadline 会以当前时间为基准重新计算。
    ///
    /// #### 参数
    /// - `period`：运行间隔。
    /// - `job`：在调度线程执行的任务。
    pub(crate) fn schedule_repeating(&self, period: Duration, job: RepeatingJob) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let scheduled = ScheduledJob {
            deadline: Instant::now() + period,
            seq,
            period,
            job,
        };
        // The worker only exits after `Shutdown`, which is sent from `drop`.
        let _ = self.tx.send(SchedulerMessage::Schedule(scheduled));
    }
}

impl Drop for RefreshScheduler {
    /// ### English
    /// Requests shutdown and joins the scheduler thread when dropping on a different thread.
    ///
    /// ### 中文
    /// drop 时请求调度线程退出；若不在同一线程 drop，则等待 join。
    fn drop(&mut self) {
        let _ = self.tx.send(SchedulerMessage::Shutdown);
        if let Some(join) = self.join.take()
            && thread::current().id() != self.thread.id()
        {
            let _ = join.join();
        }
    }
}

/// ### English
/// Scheduler thread main loop.
///
/// ### 中文
/// 调度线程主循环。
fn run_scheduler(rx: Receiver<SchedulerMessage>) {
    let mut heap: BinaryHeap<ScheduledJob> = BinaryHeap::new();

    loop {
        let message = match heap.peek() {
            Some(next) => match rx.recv_deadline(next.deadline) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return,
            },
            None => match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => return,
            },
        };

        match message {
            Some(SchedulerMessage::Schedule(job)) => {
                heap.push(job);
                continue;
            }
            Some(SchedulerMessage::Shutdown) => return,
            None => {}
        }

        let now = Instant::now();
        while heap.peek().is_some_and(|next| next.deadline <= now) {
            let Some(mut due) = heap.pop() else {
                break;
            };
            if !(due.job)() {
                continue;
            }

            due.deadline += due.period;
            let after_run = Instant::now();
            if due.deadline <= after_run {
                due.deadline = after_run + due.period;
            }
            heap.push(due);
        }
    }
}
