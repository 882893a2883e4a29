//! Comma-separated dump of a field: one line per grid row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use crate::data::global_field::GlobalField;
use crate::heat_error::HeatError;

/// Write `field` as CSV, row 0 first, no header line.
pub fn write_csv<W: Write>(field: &GlobalField, mut out: W) -> Result<(), HeatError> {
    for row in field.rows() {
        writeln!(out, "{}", row.iter().join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// Write `field` to `path`, creating parent directories as needed.
pub fn save_csv(field: &GlobalField, path: impl AsRef<Path>) -> Result<(), HeatError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    write_csv(field, BufWriter::new(File::create(path)?))?;
    log::info!("field saved to {}", path.display());
    Ok(())
}
