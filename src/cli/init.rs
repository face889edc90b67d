use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path};

pub fn run(source: Option<String>, attachments: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let first_run = !settings_file_exists();

    if let Some(src) = source {
        settings.source_file = shellexpand_path(&src);
    } else if first_run {
        if let Some(chosen) = prompt("Source spreadsheet", &settings.source_file) {
            settings.source_file = shellexpand_path(&chosen);
        }
    }

    if let Some(dir) = attachments {
        settings.attachments_dir = shellexpand_path(&dir);
    } else if first_run {
        if let Some(chosen) = prompt("Attachment directory", &settings.attachments_dir) {
            settings.attachments_dir = shellexpand_path(&chosen);
        }
    }

    save_settings(&settings)?;
    println!("Source:       {}", settings.source_file);
    println!("Attachments:  {}", settings.attachments_dir);

    if !Path::new(&settings.source_file).exists() {
        println!(
            "{}",
            format!("Warning: {} does not exist yet", settings.source_file).yellow()
        );
    }
    if !Path::new(&settings.attachments_dir).is_dir() {
        println!(
            "{}",
            format!(
                "Warning: {} is not a directory yet",
                settings.attachments_dir
            )
            .yellow()
        );
    }
    Ok(())
}

fn prompt(label: &str, default: &str) -> Option<String> {
    println!("{label} [{default}]: ");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).ok()?;
    let chosen = input.trim();
    if chosen.is_empty() {
        None
    } else {
        Some(chosen.to_string())
    }
}
