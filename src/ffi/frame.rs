//! ### English
//! C ABI bindings for frame data (producer update, consumer copy, frame info).
//!
//! ### 中文
//! 帧数据相关的 C ABI 绑定（生产者更新、消费者复制、帧信息）。

use tracing::warn;

use super::{FrameRelayFrameInfo, FrameRelayTexture};

#[unsafe(no_mangle)]
/// ### English
/// Copies a frame from host memory into a spare buffer and publishes it.
///
/// `src` must hold `height` rows of `src_pitch` bytes (the last row may be just `width * 4`).
/// Must be called from the producer thread only.
///
/// Returns the committed frame sequence number, or `0` if the frame was rejected (NULL input,
/// short source, disposed texture, or every spare buffer still being read).
///
/// ### 中文
/// 将宿主内存中的一帧复制到空闲缓冲区并发布。
///
/// `src` 必须包含 `height` 行、每行 `src_pitch` 字节（最后一行可以只有 `width * 4` 字节）。
/// 只能在生产者线程调用。
///
/// 返回提交的帧序号；若该帧被拒绝（输入为 NULL、源数据过短、纹理已销毁或所有空闲缓冲区仍在被读取），返回 `0`。
pub unsafe extern "C" fn frame_relay_texture_update(
    texture: *const FrameRelayTexture,
    src: *const u8,
    src_len: usize,
    src_pitch: u32,
) -> u64 {
    if texture.is_null() || src.is_null() || src_len == 0 {
        return 0;
    }

    let src = unsafe { std::slice::from_raw_parts(src, src_len) };
    let producer = unsafe { &mut *(*texture).producer.get() };
    let Some(producer) = producer.as_mut() else {
        return 0;
    };

    match producer.write_frame(src, src_pitch as usize) {
        Ok(Some(frame_seq)) => frame_seq,
        Ok(None) => 0,
        Err(err) => {
            warn!(%err, "frame update rejected");
            0
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Copies the latest frame into host memory, row by row.
///
/// Each row copies `min(pitch, dst_pitch)` bytes; rows that do not fit in `dst_len` are skipped.
/// Returns the number of bytes copied (0 if there is no frame yet).
///
/// ### 中文
/// 按行将最新帧复制到宿主内存。
///
/// 每行复制 `min(pitch, dst_pitch)` 字节；放不进 `dst_len` 的行会被跳过。
/// 返回复制的字节数（尚无帧时为 0）。
pub unsafe extern "C" fn frame_relay_texture_copy(
    texture: *const FrameRelayTexture,
    dst: *mut u8,
    dst_len: usize,
    dst_pitch: u32,
) -> usize {
    if texture.is_null() || dst.is_null() || dst_len == 0 {
        return 0;
    }

    let dst = unsafe { std::slice::from_raw_parts_mut(dst, dst_len) };
    unsafe { (*texture).consumer.copy_current_into(dst, dst_pitch as usize) }
}

#[unsafe(no_mangle)]
/// ### English
/// Writes the metadata of the latest frame into `out_info`.
///
/// Returns `1` on success, `0` if there is no frame yet or an argument is NULL.
///
/// ### 中文
/// 将最新帧的元数据写入 `out_info`。
///
/// 成功返回 `1`；尚无帧或参数为 NULL 时返回 `0`。
pub unsafe extern "C" fn frame_relay_texture_frame_info(
    texture: *const FrameRelayTexture,
    out_info: *mut FrameRelayFrameInfo,
) -> u8 {
    if texture.is_null() || out_info.is_null() {
        return 0;
    }

    let Some(info) = (unsafe { (*texture).consumer.current_info() }) else {
        return 0;
    };
    unsafe { out_info.write(info.into()) };
    1
}
