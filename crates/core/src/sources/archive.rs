//! Packaged artifacts (`.jar` / `.zip`) read in place

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::trace;
use zip::{ZipArchive, result::ZipError};

use crate::error::Result;

const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// True for a file that should be opened as an archive
pub fn is_archive(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

/// An open archive whose text entries can be looked up by name
pub struct ModelArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ModelArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let archive = ZipArchive::new(File::open(path)?)?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents of the entry `name`, or `None` when the archive has no such entry
    pub fn read_entry(&mut self, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                trace!("{} has no entry {}", self.path.display(), name);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        Ok(Some(contents))
    }
}

#[cfg(test)]
pub(crate) fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;
    use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}
