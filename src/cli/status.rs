use std::path::Path;

use crate::attachments::AttachmentIndex;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::loader::load_table;
use crate::report::summarize;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let source = Path::new(&settings.source_file);
    let attachments_dir = Path::new(&settings.attachments_dir);

    println!("Source:       {}", source.display());
    println!("Attachments:  {}", attachments_dir.display());
    println!();

    if source.exists() {
        let size = std::fs::metadata(source)?.len();
        println!("Source size:   {}", format_bytes(size));
        match load_table(source) {
            Ok(table) => {
                println!("Transactions:  {}", table.rows.len());
                match summarize(&table) {
                    Ok(summary) => println!("Date range:    {}", summary.date_range()),
                    Err(_) => println!("Date range:    (no rows)"),
                }
            }
            Err(e) => println!("Transactions:  (unreadable: {e})"),
        }
    } else {
        println!("Source not found. Run `disputes init` to configure.");
    }

    match AttachmentIndex::build(attachments_dir) {
        Ok(index) => {
            println!("PDFs indexed:  {}", index.len());
            if !index.warnings().is_empty() {
                println!("Index warnings: {}", index.warnings().len());
            }
        }
        Err(_) => println!("PDFs indexed:  (directory missing)"),
    }

    Ok(())
}
