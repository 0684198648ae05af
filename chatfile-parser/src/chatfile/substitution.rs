//! Model substitution
//!
//!     A chatfile can be registered under a model name. When a compiled context selects that
//!     model, the registered chatfile is compiled into its own private context, its history is
//!     put in front of the current history and its model replaces the current one. This repeats
//!     while the selected model names another registered chatfile, so a chain of files acts as
//!     layered prompt templates.
//!
//!     The walk keeps a visited set of model names: selecting a model a second time is a
//!     circular reference. The last loaded parent's model wins, and a parent without FROM
//!     leaves the model unset, which ends the walk. Names with no registered chatfile are
//!     left as opaque strings.

use crate::chatfile::context::{Context, ModelName, Transcript};
use crate::chatfile::loader::load_into_context;
use crate::chatfile::parsing::ParseError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::PathBuf;
use tracing::debug;

/// Registry of chatfiles that stand in for model names.
pub trait ModelSource {
    type Reader: BufRead;

    fn contains(&self, model: &ModelName) -> bool;

    fn open(&self, model: &ModelName) -> io::Result<Self::Reader>;
}

/// Chatfiles on disk, keyed by model name.
#[derive(Debug, Clone, Default)]
pub struct ModelFiles {
    files: HashMap<String, PathBuf>,
}

impl ModelFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: impl Into<String>, path: impl Into<PathBuf>) {
        self.files.insert(model.into(), path.into());
    }

    /// Parse a `NAME=PATH` assignment as given on the command line.
    pub fn parse_assignment(assignment: &str) -> Result<(String, PathBuf), String> {
        match assignment.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => {
                Ok((name.to_string(), PathBuf::from(path)))
            }
            _ => Err(format!("expected MODEL=CHATFILE, got `{}`", assignment)),
        }
    }

    pub fn path(&self, model: &ModelName) -> Option<&PathBuf> {
        self.files.get(model.as_str())
    }
}

impl FromIterator<(String, PathBuf)> for ModelFiles {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        ModelFiles {
            files: iter.into_iter().collect(),
        }
    }
}

impl ModelSource for ModelFiles {
    type Reader = BufReader<File>;

    fn contains(&self, model: &ModelName) -> bool {
        self.files.contains_key(model.as_str())
    }

    fn open(&self, model: &ModelName) -> io::Result<Self::Reader> {
        let path = self.path(model).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no chatfile for {}", model))
        })?;
        Ok(BufReader::new(File::open(path)?))
    }
}

/// In-memory chatfile sources, keyed by model name.
#[derive(Debug, Clone, Default)]
pub struct InlineModels {
    sources: HashMap<String, String>,
}

impl InlineModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, model: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(model.into(), source.into());
        self
    }
}

impl ModelSource for InlineModels {
    type Reader = Cursor<Vec<u8>>;

    fn contains(&self, model: &ModelName) -> bool {
        self.sources.contains_key(model.as_str())
    }

    fn open(&self, model: &ModelName) -> io::Result<Self::Reader> {
        self.sources
            .get(model.as_str())
            .map(|source| Cursor::new(source.clone().into_bytes()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, model.to_string()))
    }
}

/// Errors that can occur while substituting models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    /// The walk selected the same model twice
    CircularReference { model: ModelName },
    /// The chatfile registered for a model could not be read
    Io { model: ModelName, message: String },
    /// The chatfile registered for a model failed to parse
    Parse { model: ModelName, error: ParseError },
}

impl fmt::Display for SubstitutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionError::CircularReference { model } => {
                write!(f, "circular reference detected in model '{}'", model)
            }
            SubstitutionError::Io { model, message } => {
                write!(f, "failed to open chatfile for model '{}': {}", model, message)
            }
            SubstitutionError::Parse { model, error } => {
                write!(f, "failed to process chatfile for model '{}': {}", model, error)
            }
        }
    }
}

impl std::error::Error for SubstitutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubstitutionError::Parse { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Replace registered model names in `context` by their chatfiles until the selected model
/// is not registered. Returns how many chatfiles were spliced in.
pub fn substitute_models<S: ModelSource>(
    context: &mut Context<Transcript>,
    sources: &S,
) -> Result<usize, SubstitutionError> {
    let mut visited: HashSet<ModelName> = HashSet::new();

    while let Some(model) = context.current_model.clone() {
        if !sources.contains(&model) {
            break;
        }
        if !visited.insert(model.clone()) {
            return Err(SubstitutionError::CircularReference { model });
        }

        let reader = sources.open(&model).map_err(|err| SubstitutionError::Io {
            model: model.clone(),
            message: err.to_string(),
        })?;

        let mut parent = Context::<Transcript>::default();
        load_into_context(reader, &mut parent).map_err(|error| SubstitutionError::Parse {
            model: model.clone(),
            error,
        })?;

        debug!(
            %model,
            parent_model = ?parent.current_model,
            turns = parent.history.len(),
            "substituted model"
        );

        context.history.prepend(parent.history);
        context.current_model = parent.current_model;
    }

    Ok(visited.len())
}
