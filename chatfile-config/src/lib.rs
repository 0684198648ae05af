//! Layered configuration for the chatfile tools.
//!
//! The baseline is `defaults/chatfile.default.toml`, compiled into the crate with
//! `include_str!`. A [`Loader`] stacks `./chatfile.toml`, an explicit file and single-key
//! overrides over it, later layers winning, and deserializes the merge into
//! [`ChatfileConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError as Error;

const DEFAULT_TOML: &str = include_str!("../defaults/chatfile.default.toml");

/// Name of the project-local configuration file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "chatfile.toml";

/// Everything the `chatfile` binary reads from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatfileConfig {
    pub request: RequestConfig,
    pub output: OutputConfig,
    /// Chatfiles registered as model names, used by model substitution.
    ///
    /// An array of tables rather than a `name = path` table: `config` lowercases keys, and
    /// model names are matched verbatim.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One `[[models]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Sampling parameters sent along with every chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    pub stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Simple,
    Json,
}

/// Builds a [`ChatfileConfig`] from the embedded defaults plus any layers added to it.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// A loader holding only the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Add a TOML file; [`Loader::build`] fails if it does not exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Add a TOML file that is skipped when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `./chatfile.toml` if the working directory has one.
    pub fn with_local_file(self) -> Self {
        self.with_optional_file(LOCAL_CONFIG_FILE)
    }

    /// Force one dotted key, e.g. `request.seed`, above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers and deserialize them.
    pub fn build(self) -> Result<ChatfileConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults with nothing layered on top.
pub fn load_defaults() -> Result<ChatfileConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.request.stream);
        assert_eq!(config.request.seed, None);
        assert_eq!(config.request.temperature, None);
        assert_eq!(config.output.format, OutputFormat::Simple);
        assert!(config.models.is_empty());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("request.seed", 7i64)
            .expect("override to apply")
            .set_override("request.temperature", 0.25f64)
            .expect("override to apply")
            .set_override("output.format", "json")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.request.seed, Some(7));
        assert_eq!(config.request.temperature, Some(0.25));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let file = config_file(concat!(
            "[request]\nstream = false\ntemperature = 0.5\n\n",
            "[[models]]\nname = \"pirate\"\npath = \"prompts/pirate.chatfile\"\n",
        ));
        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert!(!config.request.stream);
        assert_eq!(config.request.temperature, Some(0.5));
        assert_eq!(config.output.format, OutputFormat::Simple);
        assert_eq!(
            config.models,
            vec![ModelEntry {
                name: "pirate".to_string(),
                path: PathBuf::from("prompts/pirate.chatfile"),
            }]
        );
    }

    #[test]
    fn model_names_keep_their_case() {
        let file = config_file(concat!(
            "[[models]]\nname = \"GPT-Pirate\"\npath = \"p.chatfile\"\n\n",
            "[[models]]\nname = \"gpt-pirate\"\npath = \"q.chatfile\"\n",
        ));
        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        let names: Vec<&str> = config.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["GPT-Pirate", "gpt-pirate"]);
        assert_eq!(config.models[0].path, PathBuf::from("p.chatfile"));
    }

    #[test]
    fn overrides_win_over_files() {
        let file = config_file("[request]\nseed = 1\n");
        let config = Loader::new()
            .with_file(file.path())
            .set_override("request.seed", 2i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.request.seed, Some(2));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = Loader::new().with_file(dir.path().join("absent.toml")).build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Loader::new()
            .with_optional_file(dir.path().join("absent.toml"))
            .build()
            .expect("config to build");
        assert!(config.request.stream);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let result = Loader::new()
            .set_override("output.format", "yaml")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
