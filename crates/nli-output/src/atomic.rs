//! Temp-file-then-rename writes and output file naming.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::OutputResult;

/// Write `path` through a sibling temp file that is renamed into place only
/// after `write` succeeds and the data is flushed.  Readers never observe a
/// partial file; on failure the temp file is deleted.
pub fn write_atomic<F>(path: &Path, write: F) -> OutputResult<()>
where
    F: FnOnce(&mut dyn Write) -> OutputResult<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ── Staged CSV ────────────────────────────────────────────────────────────────

/// A CSV file that grows over a run.
///
/// Records go to `<path>.part`; [`publish`][Self::publish] flushes it and
/// renames it to `path`.  A file under the final name is therefore always
/// complete, and an interrupted run leaves only the `.part` file behind.
/// Writing again after a publish moves the file back to `.part` and appends.
pub struct StagedCsv {
    path:    PathBuf,
    part:    PathBuf,
    header:  Vec<String>,
    writer:  Option<csv::Writer<File>>,
    started: bool,
}

impl StagedCsv {
    pub fn new(path: &Path, header: &[&str]) -> Self {
        Self {
            path:    path.to_path_buf(),
            part:    part_path(path),
            header:  header.iter().map(|h| (*h).to_owned()).collect(),
            writer:  None,
            started: false,
        }
    }

    pub fn part_path(&self) -> &Path {
        &self.part
    }

    /// Create (or reopen) the `.part` file without writing a record.
    pub fn open(&mut self) -> OutputResult<()> {
        self.writer()?;
        Ok(())
    }

    pub fn write_record<I, T>(&mut self, record: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer()?.write_record(record)?;
        Ok(())
    }

    /// Flush and move the file to its final name.  A no-op when nothing is
    /// open.
    pub fn publish(&mut self) -> OutputResult<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&self.part, &self.path)?;
        Ok(())
    }

    fn writer(&mut self) -> OutputResult<&mut csv::Writer<File>> {
        let writer = match self.writer.take() {
            Some(w) => w,
            None => self.reopen()?,
        };
        Ok(self.writer.insert(writer))
    }

    fn reopen(&mut self) -> OutputResult<csv::Writer<File>> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        if !self.started {
            let mut writer = csv::Writer::from_writer(File::create(&self.part)?);
            writer.write_record(&self.header)?;
            self.started = true;
            return Ok(writer);
        }
        if self.path.exists() {
            fs::rename(&self.path, &self.part)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.part)?;
        Ok(csv::Writer::from_writer(file))
    }
}

/// `<path>.part`
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

// ── Naming ────────────────────────────────────────────────────────────────────

/// The time part of an output file name.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Stamp {
    /// Zero-padded simulated time, e.g. `0012.500`.
    Time(f64),
    /// Written once when the run finishes.
    Final,
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Time(t) => write!(f, "{t:08.3}"),
            Stamp::Final   => f.write_str("final"),
        }
    }
}

/// `<dir>/<stem>-<stamp>.<ext>`
pub fn stamped_path(dir: &Path, stem: &str, stamp: Stamp, ext: &str) -> PathBuf {
    dir.join(format!("{stem}-{stamp}.{ext}"))
}
