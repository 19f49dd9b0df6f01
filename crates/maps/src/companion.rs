//! Companion document storage
//!
//! Every `.map` file travels with an editable document of the same base
//! name in the same directory. The binary file is derived from it; the
//! document is the source of truth. The document format belongs to whoever
//! implements [`CompanionStore`].

use crate::document::MapDocument;
use crate::error::{MapError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Loads and saves companion documents
pub trait CompanionStore {
    /// File extension of the document format, without the dot
    fn extension(&self) -> &str;

    /// Load a document
    fn load(&self, path: &Path) -> Result<MapDocument>;

    /// Save a document
    fn save(&self, doc: &MapDocument, path: &Path) -> Result<()>;
}

/// Path of the companion document for a binary map file
///
/// Same directory and base name, extension replaced.
pub fn companion_path(map_path: &Path, extension: &str) -> PathBuf {
    map_path.with_extension(extension)
}

/// Companion documents stored as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCompanionStore {
    /// Pretty-print on save
    pub pretty: bool,
}

impl JsonCompanionStore {
    pub const EXTENSION: &'static str = "json";

    pub fn new() -> Self {
        Self { pretty: true }
    }
}

impl CompanionStore for JsonCompanionStore {
    fn extension(&self) -> &str {
        Self::EXTENSION
    }

    fn load(&self, path: &Path) -> Result<MapDocument> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MapError::CompanionMapMissing(path.display().to_string()),
            _ => unreadable(path, e),
        })?;

        let doc: MapDocument = serde_json::from_reader(BufReader::new(file)).map_err(|e| unreadable(path, e))?;
        doc.validate().map_err(|e| unreadable(path, e))?;
        Ok(doc)
    }

    fn save(&self, doc: &MapDocument, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut writer, doc)
        } else {
            serde_json::to_writer(&mut writer, doc)
        };
        written.map_err(|e| MapError::Io(e.into()))?;
        writer.flush()?;
        Ok(())
    }
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> MapError {
    MapError::CompanionMapUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
