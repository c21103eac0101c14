//! Input resolution: files are taken as given, directories are walked for `*.log` / `*.txt`.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const LOG_EXTENSIONS: &[&str] = &["log", "txt"];

fn is_log_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOG_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Expand the command-line paths into the list of log files to parse, in a stable order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry?;
                if entry.file_type().is_file() && is_log_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            tracing::debug!(dir = %path.display(), files = found.len(), "walked input directory");
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    }

    if files.is_empty() {
        let shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        return Err(Error::NoInput(shown.join(", ")));
    }

    Ok(files)
}

/// Read a log as text; invalid UTF-8 sequences are replaced rather than rejected.
pub fn read_log(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), "log is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}
