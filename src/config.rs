use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Name of the Recipe Keeper export inside the source directory
pub const SOURCE_FILE: &str = "recipes.html";
/// Name of the Paprika import file written to the output directory
pub const OUTPUT_FILE: &str = "recipes.yml";

/// Paths for a single conversion run
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Directory holding `recipes.html` and the exported photos
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Directory that receives `recipes.yml`; created when missing
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./RecipeKeeper")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./Output")
}

impl ConverterConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RK2PAPRIKA__ prefix
    /// 2. rk2paprika.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RK2PAPRIKA__SOURCE_DIR
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("rk2paprika").required(false))
            .add_source(Environment::with_prefix("RK2PAPRIKA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn source_file(&self) -> PathBuf {
        self.source_dir.join(SOURCE_FILE)
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE)
    }
}
