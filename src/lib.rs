//! Converts a Recipe Keeper HTML export into a Paprika YAML import file.
//!
//! The conversion is a single pass: the export is parsed, every recipe block
//! is mapped onto Paprika's schema, and the resulting list is written as one
//! YAML document.

pub mod config;
pub mod converters;
pub mod duration;
pub mod error;
pub mod extractors;
pub mod markdown;
pub mod model;
pub mod writer;

use log::{debug, info};
use scraper::Html;
use std::path::Path;

use crate::converters::{ConvertRecipe, PaprikaConverter};
use crate::extractors::{Extractor, RecipeKeeperExtractor};

pub use crate::config::ConverterConfig;
pub use crate::error::{ConvertError, Result};
pub use crate::model::{Favorite, PaprikaRecipe};

/// Maps every recipe of a parsed export, in document order. Photo paths
/// are resolved against `source_dir`.
pub fn convert_document(document: &Html, source_dir: &Path) -> Result<Vec<PaprikaRecipe>> {
    let recipes = RecipeKeeperExtractor.extract(document)?;
    let converter = PaprikaConverter::new(source_dir);

    recipes
        .iter()
        .map(|recipe| converter.convert(recipe))
        .collect()
}

/// Converts `recipes.html` in the configured source directory and writes
/// `recipes.yml` to the output directory. Returns the number of recipes.
pub fn convert(config: &ConverterConfig) -> Result<usize> {
    let source_file = config.source_file();
    debug!("Loading export from {}", source_file.display());
    let document = extractors::load_document(&source_file)?;

    let recipes = convert_document(&document, &config.source_dir)?;

    let output_file = config.output_file();
    writer::write_recipes(&output_file, &recipes)?;

    info!(
        "Converted {} recipes to {}",
        recipes.len(),
        output_file.display()
    );
    Ok(recipes.len())
}
