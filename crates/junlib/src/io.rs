//! File layer bound to an explicit base directory

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{JsonWriteOptions, ParseConfig, WriteOptions};
use crate::error::{Error, Result};
use crate::json::{from_json_str, to_json_string_with_options};
use crate::schema::SchemaDescription;
use crate::value::Value;
use crate::xml::model::{Document, Element};
use crate::xml::parser::Parser;
use crate::xml::writer;

/// Loads and saves documents relative to a base directory.
///
/// Relative paths resolve against the base directory, absolute paths are
/// used as given.
#[derive(Clone, Debug)]
pub struct Loader {
    base_dir: PathBuf,
    config: ParseConfig,
}

impl Loader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(base_dir, ParseConfig::default())
    }

    /// Loader whose XML parsing uses `config`
    pub fn with_config(base_dir: impl Into<PathBuf>, config: ParseConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn load_xml(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = self.resolve(path);
        debug!(path = %path.display(), "loading xml");
        let bytes = fs::read(&path).map_err(|err| Error::io(&path, &err))?;
        Parser::with_config(&bytes, self.config).parse()
    }

    pub fn save_xml(
        &self,
        path: impl AsRef<Path>,
        element: &Element,
        options: &WriteOptions,
    ) -> Result<PathBuf> {
        self.write(path, &writer::to_string(element, options))
    }

    pub fn load_json(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = self.resolve(path);
        debug!(path = %path.display(), "loading json");
        let text = fs::read_to_string(&path).map_err(|err| Error::io(&path, &err))?;
        from_json_str(&text)
    }

    pub fn save_json(
        &self,
        path: impl AsRef<Path>,
        value: &Value,
        options: &JsonWriteOptions,
    ) -> Result<PathBuf> {
        self.write(path, &to_json_string_with_options(value, options)?)
    }

    /// Write the complete schema document
    pub fn save_schema(
        &self,
        path: impl AsRef<Path>,
        schema: &SchemaDescription,
    ) -> Result<PathBuf> {
        self.write(path, &schema.to_document())
    }

    fn write(&self, path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
        let path = self.resolve(path);
        fs::write(&path, contents).map_err(|err| Error::io(&path, &err))?;
        info!(path = %path.display(), bytes = contents.len(), "saved");
        Ok(path)
    }
}

impl Default for Loader {
    /// Loader rooted at the current directory
    fn default() -> Self {
        Self::new(".")
    }
}
