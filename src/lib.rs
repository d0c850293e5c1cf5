pub mod component;
pub mod config;
pub mod init;
pub mod menu;
pub mod signal;
pub mod tools;

use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;

rust_i18n::i18n!("locales", fallback = "en-US");

pub fn pause(term: &Term) -> Result<()> {
    println!("\n{}", style(t!("common.press_enter")).dim());
    term.read_line()?;
    Ok(())
}

/// 結束時的道別訊息（依目前語系）
#[must_use]
pub fn goodbye_message() -> String {
    t!("main_menu.goodbye").to_string()
}

#[must_use]
pub fn error_prefix() -> String {
    t!("common.error_prefix").to_string()
}
