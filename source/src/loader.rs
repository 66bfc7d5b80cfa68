//! Definition loading with builder pattern and fallback chains.
//!
//! Provides [`DefinitionSet`] for collecting form definitions from
//! documents on disk and [`DefinitionSetBuilder`] for constructing a set
//! from multiple candidate locations with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use form_schema_source::DefinitionSet;
//!
//! // Load every document in a directory
//! let set = DefinitionSet::from_dir("schemas/").unwrap();
//! let registry = set.into_registry().unwrap();
//!
//! // Use the builder for a fallback chain
//! let set = DefinitionSet::builder()
//!     .from_dir("schemas/")
//!     .from_file("bundle.json")
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use form_schema_core::{FormDefinition, FormRegistry};

use crate::document::FormDocument;
use crate::error::{Result, SourceError};

/// Describes where a [`DefinitionSet`] was loaded from.
///
/// Renders as a human-readable location (`directory schemas/`,
/// `file bundle.json`, combined locations joined by commas) for load
/// summaries.
#[derive(Debug, Clone)]
pub enum DefinitionSource {
    /// Loaded from every supported document in a directory.
    Directory(PathBuf),
    /// Loaded from a single document file.
    File(PathBuf),
    /// Loaded from several locations combined.
    Multiple(Vec<DefinitionSource>),
}

impl fmt::Display for DefinitionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionSource::Directory(path) => write!(f, "directory {}", path.display()),
            DefinitionSource::File(path) => write!(f, "file {}", path.display()),
            DefinitionSource::Multiple(sources) => {
                for (index, source) in sources.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{source}")?;
                }
                Ok(())
            }
        }
    }
}

/// In-memory collection of form definitions with document provenance.
///
/// Each form's `source` field is filled with the path of the document it
/// was read from unless the document already declares one.
#[derive(Debug)]
pub struct DefinitionSet {
    forms: Vec<FormDefinition>,
    source: DefinitionSource,
}

impl DefinitionSet {
    /// Returns a new [`DefinitionSetBuilder`] for configuring a fallback
    /// chain.
    pub fn builder() -> DefinitionSetBuilder {
        DefinitionSetBuilder::new()
    }

    /// Loads every `*.json`, `*.yaml`, and `*.yml` document in a
    /// directory, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::IoError`] if the directory cannot be read,
    /// or a parse error if any document is malformed.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|file| {
                matches!(
                    file.extension().and_then(|e| e.to_str()),
                    Some("json" | "yaml" | "yml")
                )
            })
            .collect();
        files.sort();

        let mut forms = Vec::new();
        for file in &files {
            forms.extend(load_document(file)?);
        }
        debug!(
            directory = %path.display(),
            documents = files.len(),
            forms = forms.len(),
            "loaded definition directory"
        );
        Ok(Self {
            forms,
            source: DefinitionSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a single document file, picking the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnsupportedFormat`] for an unknown
    /// extension, [`SourceError::IoError`] if the file cannot be read, or
    /// a parse error if the document is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let forms = load_document(path)?;
        debug!(file = %path.display(), forms = forms.len(), "loaded definition document");
        Ok(Self {
            forms,
            source: DefinitionSource::File(path.to_path_buf()),
        })
    }

    /// Loads and combines several files and/or directories.
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut forms = Vec::new();
        let mut sources = Vec::new();
        for path in paths {
            let set = if path.as_ref().is_dir() {
                Self::from_dir(path)?
            } else {
                Self::from_file(path)?
            };
            forms.extend(set.forms);
            sources.push(set.source);
        }
        Ok(Self {
            forms,
            source: DefinitionSource::Multiple(sources),
        })
    }

    /// The loaded forms, in document order.
    pub fn forms(&self) -> &[FormDefinition] {
        &self.forms
    }

    /// Where this set was loaded from.
    pub fn source(&self) -> &DefinitionSource {
        &self.source
    }

    /// Number of loaded forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Returns `true` when no forms were loaded.
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Hands the loaded forms to the registry, which enforces global form
    /// uniqueness.
    pub fn into_registry(self) -> Result<FormRegistry> {
        Ok(FormRegistry::from_forms(self.forms)?)
    }
}

fn load_document(path: &Path) -> Result<Vec<FormDefinition>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let document: FormDocument = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_reader(reader)?,
        Some("yaml" | "yml") => serde_yaml::from_reader(reader)?,
        _ => return Err(SourceError::UnsupportedFormat(path.to_path_buf())),
    };

    let provenance = path.display().to_string();
    let forms = document
        .forms
        .into_iter()
        .map(|mut form| {
            if form.source.is_empty() {
                form.source = provenance.clone();
            }
            form
        })
        .collect();
    Ok(forms)
}

/// Candidate location in a [`DefinitionSetBuilder`] fallback chain.
#[derive(Debug, Clone)]
enum BuilderSource {
    Directory(PathBuf),
    File(PathBuf),
}

/// Builds a [`DefinitionSet`] from the first candidate location that loads
/// successfully.
#[derive(Debug, Default)]
pub struct DefinitionSetBuilder {
    sources: Vec<BuilderSource>,
}

impl DefinitionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory candidate.
    pub fn from_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.sources
            .push(BuilderSource::Directory(path.as_ref().to_path_buf()));
        self
    }

    /// Adds a single-document candidate.
    pub fn from_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources
            .push(BuilderSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Tries each candidate in order and returns the first that loads.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoSourcesAvailable`] when every candidate
    /// fails.
    pub fn build(self) -> Result<DefinitionSet> {
        for source in &self.sources {
            let attempt = match source {
                BuilderSource::Directory(path) => DefinitionSet::from_dir(path),
                BuilderSource::File(path) => DefinitionSet::from_file(path),
            };
            match attempt {
                Ok(set) => return Ok(set),
                Err(error) => {
                    debug!(source = ?source, %error, "definition source failed, trying next");
                }
            }
        }
        Err(SourceError::NoSourcesAvailable)
    }
}
