use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::attachments::{AttachmentIndex, AttachmentState};
use crate::error::{DisputeError, Result};
use crate::fmt::{display_date, format_bytes};
use crate::loader::parse_date_str;
use crate::settings::load_settings;

fn resolve_dir(attachments: Option<String>) -> PathBuf {
    PathBuf::from(attachments.unwrap_or_else(|| load_settings().attachments_dir))
}

pub fn list(attachments: Option<String>) -> Result<()> {
    let dir = resolve_dir(attachments);
    let index = AttachmentIndex::build(&dir)?;

    if index.is_empty() {
        println!("No attachments found in {}", dir.display());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Key", "File"]);
        for (key, file_name) in index.entries() {
            table.add_row(vec![Cell::new(key), Cell::new(file_name)]);
        }
        println!("Attachments in {}\n{table}", dir.display());
    }

    for w in index.warnings() {
        println!("{}", format!("Warning: {w}").yellow());
    }
    Ok(())
}

pub fn save(date: &str, output: Option<String>, attachments: Option<String>) -> Result<()> {
    let date = parse_date_str(date).ok_or_else(|| {
        DisputeError::Other(format!("invalid date '{date}' \u{2014} expected YYYY-MM-DD"))
    })?;
    let dir = resolve_dir(attachments);
    let index = AttachmentIndex::build(&dir)?;

    match index.load(date) {
        AttachmentState::Loaded(att) => {
            let path = output
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&att.file_name));
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, &att.bytes)?;
            println!(
                "Saved {} ({}) to {}",
                att.file_name,
                format_bytes(att.bytes.len() as u64),
                path.display()
            );
            Ok(())
        }
        AttachmentState::ReadFailed { file_name, detail } => {
            Err(DisputeError::AttachmentRead { file_name, detail })
        }
        AttachmentState::NotFound => Err(DisputeError::AttachmentNotFound(display_date(date))),
    }
}
