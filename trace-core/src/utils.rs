use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to open file {}: {}", path.display(), e))
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// File name of `path` with its data extension removed: `.vcf.gz`, `.vcf`,
/// `.bed.gz`, `.bed` or `.out` are stripped, anything else is kept.
///
pub fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("trace")
        .to_string();

    for ext in [".vcf.gz", ".vcf.bgz", ".vcf", ".bed.gz", ".bed", ".out"] {
        let lower = name.to_lowercase();
        if lower.len() == name.len() && lower.ends_with(ext) && lower.len() > ext.len() {
            return name[..name.len() - ext.len()].to_string();
        }
    }
    name
}

///
/// Derive a sibling output path: `dir/sample.vcf` + `_annotated.vcf` -> `dir/sample_annotated.vcf`.
///
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let name = format!("{}{}", file_stem(input), suffix);
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
