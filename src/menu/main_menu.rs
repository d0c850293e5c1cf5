use crate::config::save::{add_recent_path, save_settings};
use crate::config::types::{Config, DigestMode, Language};
use crate::menu::handlers::run_video_digest;
use crate::tools::validate_directory_exists;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_digest"),
        t!("main_menu.opt_trailer"),
        t!("main_menu.opt_add_root"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_video_digest(term, shutdown_signal, config, DigestMode::Digest)?;
            Ok(true)
        }
        Some(1) => {
            run_video_digest(term, shutdown_signal, config, DigestMode::Trailer)?;
            Ok(true)
        }
        Some(2) => {
            show_add_root_menu(term, config)?;
            Ok(true)
        }
        Some(3) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(4) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 新增掃描根目錄
fn show_add_root_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("roots.title")).cyan().bold());
    for root in config.effective_roots() {
        println!("  - {}", root.display());
    }
    println!();

    let path: String = Input::new()
        .with_prompt(t!("roots.prompt"))
        .allow_empty(true)
        .interact_text()?;
    let path = path.trim();

    if path.is_empty() {
        return Ok(());
    }

    if let Err(e) = validate_directory_exists(&PathBuf::from(path)) {
        println!("\n{} {}", style(t!("common.error_prefix")).red().bold(), e);
    } else {
        add_recent_path(&mut config.settings, path);
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), path);
    }
    std::thread::sleep(std::time::Duration::from_secs(1));

    Ok(())
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_validation"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_validation_menu(term, config)?,
            Some(1) => show_language_menu(term, config)?,
            Some(2) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 片段長度驗證設定
fn show_validation_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.validation.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let items: Vec<String> = vec![
        t!("settings.validation.enabled").to_string(),
        t!("settings.validation.disabled").to_string(),
    ];
    let default_index = usize::from(!config.settings.validate_segments);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.validation.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let validate = selection == 0;
    if validate != config.settings.validate_segments {
        config.settings.validate_segments = validate;
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), items[selection]);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(|l: &Language| l.to_string()).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
