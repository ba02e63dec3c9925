use tracing::debug;

use super::{FrameTexture, LifecycleState};

impl FrameTexture {
    /// ### English
    /// Tears the texture down (idempotent).
    ///
    /// Order: stop the periodic signal, invalidate and drain pending notification hand-offs,
    /// unregister from the host, mark `Disposed`, release the pool. Waits for a tick or hand-off
    /// running on another thread; when called from inside one (e.g. from the host's
    /// `frame_available`), it does not wait for itself.
    ///
    /// Outstanding `BufferHandle`s / `BufferView`s keep their buffer memory valid; it is freed when
    /// the last of them drops. After this returns, commits are rejected with `NotActive` and reads
    /// return nothing.
    ///
    /// ### 中文
    /// 销毁纹理（幂等）。
    ///
    /// 顺序：停止周期信号，使待处理的通知交接失效并等待其排空，从宿主注销，标记 `Disposed`，释放缓冲池。
    /// 会等待在其它线程上运行的 tick 或交接任务；若在其内部调用（例如在宿主的 `frame_available` 中），
    /// 则不会等待自身。
    ///
    /// 尚未释放的 `BufferHandle` / `BufferView` 会保持其缓冲区内存有效，直到最后一个被释放。
    /// 返回后，commit 会以 `NotActive` 被拒绝，读取不会返回任何帧。
    #[tracing::instrument(level = "debug", skip(self), fields(texture_id = %self.shared.texture_id))]
    pub fn dispose(&mut self) {
        let Some(frames) = self.frames.take() else {
            return;
        };

        self.ticks.stop();
        if !self.shared.delivery.close() {
            debug!("disposing from inside a frame notification");
        }

        self.shared.host.unregister_texture(self.shared.texture_id);
        frames.set_active(false);
        self.shared.set_state(LifecycleState::Disposed);
        drop(frames);
        debug!("texture disposed");
    }
}
