use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub struct WalkConfig {
    /// Descend below the top level of the root
    pub recursive: bool,
}

/// List every file under `root`, symlinked files included.
///
/// A directory named on the command line is the batch, so hidden and
/// gitignored files are not filtered out here; whatever cannot be read ends
/// up in the skipped list instead. Returned paths are sorted so a batch
/// always loads in the same order.
pub fn walk_files(root: &Path, config: &WalkConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .max_depth(if config.recursive { None } else { Some(1) })
        .standard_filters(false)
        .follow_links(true)
        .build();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

/// Document id for a walked file: its path below `root`, `/`-separated.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
