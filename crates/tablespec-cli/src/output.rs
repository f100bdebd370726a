use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::CliError;

/// Write `content` to `path` atomically, or to stdout when no path is given.
pub fn emit_text(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => {
            let mut data = content.as_bytes().to_vec();
            if !content.ends_with('\n') {
                data.push(b'\n');
            }
            write_bytes_atomic(path, &data)?;
            tracing::info!(event = "artifact_written", path = %path.display(), bytes = data.len());
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content.trim_end_matches('\n'))?;
            stdout.flush()?;
            Ok(())
        }
    }
}

pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), CliError> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = parent {
        sync_dir(parent)?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidOutput(path.display().to_string()))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
