use super::{selector, Extractor, SourceRecipe};
use crate::error::Result;
use log::debug;
use scraper::Html;

/// Every Recipe Keeper recipe block carries these markers.
pub const REQUIRED_MARKERS: &[&str] = &[
    "name",
    "recipeYield",
    "recipeIsFavourite",
    "recipeRating",
    "recipeSource",
    "recipeNotes",
    "recipeIngredients",
    "recipeDirections",
    "prepTime",
    "cookTime",
];

const RECIPE_CONTAINER: &str = ".recipe-details";

/// Splits a Recipe Keeper HTML export into its recipe blocks
pub struct RecipeKeeperExtractor;

impl Extractor for RecipeKeeperExtractor {
    fn extract<'a>(&self, document: &'a Html) -> Result<Vec<SourceRecipe<'a>>> {
        let container = selector(RECIPE_CONTAINER)?;

        let recipes = document
            .select(&container)
            .enumerate()
            .map(|(i, element)| SourceRecipe::new(i + 1, element))
            .collect::<Vec<_>>();

        for recipe in &recipes {
            for marker in REQUIRED_MARKERS {
                recipe.required(marker)?;
            }
        }

        debug!("Found {} recipes in export", recipes.len());
        Ok(recipes)
    }
}
