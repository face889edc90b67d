pub mod text;
pub mod view;

use std::io::IsTerminal;
use std::path::PathBuf;

use crate::error::Result;
use crate::loader::TableCache;

/// Dispatch the report: `--output` writes the text rendering to a file,
/// a terminal gets the interactive viewer (unless `--text`), anything
/// else gets plain text on stdout.
pub fn run(
    source: Option<String>,
    attachments: Option<String>,
    force_text: bool,
    output: Option<String>,
) -> Result<()> {
    let (source, attachments_dir) = super::resolve_paths(source, attachments);
    let mut cache = TableCache::new(source);

    if let Some(path) = output {
        let s = text::render(&mut cache, &attachments_dir)?;
        let p = PathBuf::from(&path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&p, format!("{s}\n"))?;
        println!("Wrote {}", p.display());
        Ok(())
    } else if std::io::stdout().is_terminal() && !force_text {
        view::run(&mut cache, &attachments_dir)
    } else {
        let s = text::render(&mut cache, &attachments_dir)?;
        println!("{s}");
        Ok(())
    }
}
