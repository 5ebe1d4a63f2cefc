use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tempfile::NamedTempFile;

use super::error::{DatasetError, DatasetResult};
use super::record::DomainRecord;
use crate::logic::features::layout;

/// Directory a file will be created in ("." for bare file names)
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Temp file next to `path`, so the final rename stays on one filesystem
pub fn temp_file_for(path: &Path) -> DatasetResult<NamedTempFile> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| DatasetError::io(&dir, e))?;
    NamedTempFile::new_in(&dir).map_err(|e| DatasetError::io(&dir, e))
}

/// Fsync and atomically move a finished temp file over `path`
pub fn persist(tmp: NamedTempFile, path: &Path) -> DatasetResult<()> {
    tmp.as_file().sync_all().map_err(|e| DatasetError::io(path, e))?;
    tmp.persist(path).map_err(|e| DatasetError::io(path, e.error))?;
    Ok(())
}

/// Write `bytes` to `path` via temp file + rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> DatasetResult<()> {
    let mut tmp = temp_file_for(path)?;
    tmp.write_all(bytes).map_err(|e| DatasetError::io(path, e))?;
    persist(tmp, path)
}

/// Incremental CSV dataset writer.
///
/// Rows go to a temp file in the destination directory; the header is
/// written once on creation and every later `append` only adds rows.
/// Nothing appears at `path` until `commit`. Dropping the writer
/// without committing discards the temp file.
pub struct DatasetWriter {
    path: PathBuf,
    writer: csv::Writer<NamedTempFile>,
    rows: usize,
}

impl DatasetWriter {
    pub fn create(path: &Path, with_id: bool) -> DatasetResult<Self> {
        let tmp = temp_file_for(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(tmp);

        writer
            .write_record(layout::dataset_columns(with_id))
            .map_err(|e| DatasetError::csv(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &DomainRecord) -> DatasetResult<()> {
        self.writer
            .serialize(record)
            .map_err(|e| DatasetError::csv(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn append_all<'r, I>(&mut self, records: I) -> DatasetResult<usize>
    where
        I: IntoIterator<Item = &'r DomainRecord>,
    {
        let before = self.rows;
        for record in records {
            self.append(record)?;
        }
        self.writer.flush().map_err(|e| DatasetError::io(&self.path, e))?;
        Ok(self.rows - before)
    }

    /// Flush and move the finished file into place. Returns rows written.
    pub fn commit(self) -> DatasetResult<usize> {
        let Self { path, writer, rows } = self;
        let tmp = writer
            .into_inner()
            .map_err(|e| DatasetError::io(&path, e.into_error()))?;
        persist(tmp, &path)?;

        log::debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }
}

/// Write a full dataset file in one go
pub fn write_dataset(path: &Path, records: &[DomainRecord], with_id: bool) -> DatasetResult<usize> {
    let mut writer = DatasetWriter::create(path, with_id)?;
    writer.append_all(records)?;
    writer.commit()
}
