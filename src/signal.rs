use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 設定 Ctrl-C 處理器，回傳共用的中斷旗標
///
/// 處理器只設定旗標；正在執行的 ffmpeg 會被終止，暫存片段在清理後才結束。
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    if let Err(e) = ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，正在清理暫存檔並安全關閉...");
    }) {
        warn!("無法設定 Ctrl-C 處理器: {e}");
    }

    shutdown_signal
}
