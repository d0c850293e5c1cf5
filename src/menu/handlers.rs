use crate::component::VideoDigest;
use crate::config::{Config, DigestMode};
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_video_digest(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
    mode: DigestMode,
) -> Result<()> {
    let digest = VideoDigest::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = digest.run(mode) {
        eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
    }

    pause(term)?;
    Ok(())
}
