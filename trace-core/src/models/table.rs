use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use log::warn;

use crate::errors::{Result, TraceError};
use crate::models::annotation::ConsolidatedAnnotation;
use crate::models::hit::EvidenceSource;
use crate::utils::get_dynamic_reader;

///
/// One `<id>\t<value>` row of a consolidated table file, before any grouping.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line_number: usize,
    pub variant_id: String,
    pub value: String,
}

///
/// Read the rows of a consolidated table. Comment (`#`) and blank lines are
/// skipped; rows without a value column are logged and skipped.
///
pub fn read_table_rows<R: BufRead>(reader: R) -> Result<Vec<TableRow>> {
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('\t') {
            Some((id, value)) if !id.is_empty() && !value.is_empty() => rows.push(TableRow {
                line_number: i + 1,
                variant_id: id.to_string(),
                value: value.to_string(),
            }),
            _ => warn!(
                "{}",
                TraceError::parse("consolidated table", i + 1, "expected <id>\\t<value>")
            ),
        }
    }

    Ok(rows)
}

pub fn read_table_rows_from_path(path: &Path) -> Result<Vec<TableRow>> {
    let reader = get_dynamic_reader(path)?;
    read_table_rows(reader)
}

///
/// One consolidated annotation per variant identity for a single evidence source,
/// kept sorted by identity so that writing it is deterministic.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedTable {
    pub source: EvidenceSource,
    annotations: BTreeMap<String, ConsolidatedAnnotation>,
}

impl ConsolidatedTable {
    pub fn new(source: EvidenceSource) -> Self {
        ConsolidatedTable {
            source,
            annotations: BTreeMap::new(),
        }
    }

    ///
    /// Insert an annotation, returning the one it replaced.
    ///
    pub fn insert(&mut self, annotation: ConsolidatedAnnotation) -> Option<ConsolidatedAnnotation> {
        self.annotations
            .insert(annotation.variant_id.clone(), annotation)
    }

    pub fn get(&self, variant_id: &str) -> Option<&ConsolidatedAnnotation> {
        self.annotations.get(variant_id)
    }

    pub fn contains(&self, variant_id: &str) -> bool {
        self.annotations.contains_key(variant_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.annotations.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsolidatedAnnotation> {
        self.annotations.values()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    ///
    /// Write the table as TSV with a `#ID\t<tag>` header.
    ///
    pub fn write<W: Write>(&self, writer: &mut W, tag: &str) -> std::io::Result<()> {
        writeln!(writer, "#ID\t{}", tag)?;
        for annotation in self.annotations.values() {
            writeln!(writer, "{}\t{}", annotation.variant_id, annotation.render())?;
        }
        Ok(())
    }

    pub fn write_to_path<T: AsRef<Path>>(&self, path: T, tag: &str) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer, tag)?;
        writer.flush()
    }
}
