use crate::error::{ConvertError, Result};
use crate::model::PaprikaRecipe;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Encodes the recipes as a YAML sequence, one mapping per recipe.
///
/// Long values such as embedded photos stay on one line and multi-line
/// text is written as block scalars.
pub fn to_yaml(recipes: &[PaprikaRecipe]) -> Result<String> {
    Ok(serde_yaml::to_string(recipes)?)
}

/// Writes the recipes to `path`, replacing any existing file. The parent
/// directory is created when missing and the file is swapped in whole.
pub fn write_recipes(path: &Path, recipes: &[PaprikaRecipe]) -> Result<()> {
    let yaml = to_yaml(recipes)?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| ConvertError::io(dir, e))?;
    file.write_all(yaml.as_bytes())
        .map_err(|e| ConvertError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| ConvertError::io(path, e.error))?;

    debug!("Wrote {} bytes to {}", yaml.len(), path.display());
    Ok(())
}
