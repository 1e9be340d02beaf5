use std::fs::{File, remove_file, rename};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use trace_core::errors::{Result, TraceError};

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

///
/// Run `write` against the final output, so that either the whole output
/// exists afterwards or nothing does.
///
/// With a path, the content goes to a hidden sibling file that is renamed into
/// place once `write` succeeded, and removed otherwise. Without a path (or with
/// `-`) the content goes to stdout.
///
/// # Arguments
/// - path: destination file, or `None` for stdout
/// - overwrite: replace an existing destination instead of refusing
/// - write: produces the content
///
pub fn write_output<T, F>(path: Option<&Path>, overwrite: bool, write: F) -> Result<T>
where
    F: FnOnce(&mut dyn Write) -> Result<T>,
{
    let path = match path {
        Some(path) if path != Path::new("-") => path,
        _ => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let result = write(&mut writer)?;
            writer.flush()?;
            return Ok(result);
        }
    };

    if path.exists() && !overwrite {
        return Err(TraceError::OutputExists(path.display().to_string()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let partial = temporary_sibling(path);
    let outcome = (|| -> Result<T> {
        let mut writer = BufWriter::new(File::create(&partial)?);
        let result = write(&mut writer)?;
        writer.flush()?;
        Ok(result)
    })();

    match outcome {
        Ok(result) => {
            rename(&partial, path)?;
            debug!("Wrote {}", path.display());
            Ok(result)
        }
        Err(e) => {
            if partial.exists() {
                let _ = remove_file(&partial);
            }
            Err(e)
        }
    }
}
