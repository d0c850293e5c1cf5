use anyhow::Result;
use auto_video_digest::config::types::Config;
use auto_video_digest::menu::show_main_menu;
use auto_video_digest::signal::setup_shutdown_signal;
use auto_video_digest::{error_prefix, goodbye_message, init};
use console::{Term, style};
use log::{info, warn};
use std::sync::atomic::Ordering;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    // Load config and set locale
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) if shutdown_signal.load(Ordering::SeqCst) => {
                info!("Program interrupted, exiting");
                break;
            }
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(goodbye_message()).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(error_prefix()).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
