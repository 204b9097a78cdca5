use crate::error::Result;
use crate::extractors::SourceRecipe;
use crate::model::PaprikaRecipe;

mod paprika;

pub use paprika::{
    build_categories, parse_rating, strip_servings_label, NutritionFact, PaprikaConverter,
    NUTRITION_FACTS,
};

pub trait ConvertRecipe {
    fn convert(&self, recipe: &SourceRecipe) -> Result<PaprikaRecipe>;
}
