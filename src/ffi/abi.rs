#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn frame_relay_abi_version() -> u32 {
    super::FRAME_RELAY_ABI_VERSION
}
