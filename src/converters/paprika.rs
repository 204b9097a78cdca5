use super::ConvertRecipe;
use crate::duration::parse_times;
use crate::error::{ConvertError, Result};
use crate::extractors::{content, content_or_text, text, SourceRecipe};
use crate::markdown::MarkdownConverter;
use crate::model::{Favorite, PaprikaRecipe};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;
use url::Url;

/// A Recipe Keeper nutrition marker and how Paprika labels it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutritionFact {
    /// Suffix of the `recipeNut<key>` marker
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

const fn fact(key: &'static str, label: &'static str, unit: &'static str) -> NutritionFact {
    NutritionFact { key, label, unit }
}

/// Nutrition facts in the order they are listed in `nutritional_info`
pub const NUTRITION_FACTS: [NutritionFact; 9] = [
    fact("Calories", "Calories", ""),
    fact("TotalFat", "Total Fat", "g"),
    fact("SaturatedFat", "Saturated Fat", "g"),
    fact("Cholesterol", "Cholesterol", "mg"),
    fact("Sodium", "Sodium", "mg"),
    fact("TotalCarbohydrate", "Total Carbohydrate", "g"),
    fact("DietaryFiber", "Dietary Fiber", "g"),
    fact("Sugars", "Sugars", "g"),
    fact("Protein", "Protein", "g"),
];

const PHOTO_SELECTOR: &str = ".recipe-photos-div img";
const SERVINGS_LABEL: &str = "servings";

/// Maps Recipe Keeper recipe blocks onto Paprika's import schema
pub struct PaprikaConverter {
    source_dir: PathBuf,
    markdown: MarkdownConverter,
}

impl PaprikaConverter {
    /// `source_dir` is the directory photo paths are resolved against.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            markdown: MarkdownConverter::paprika(),
        }
    }

    pub fn with_markdown(mut self, markdown: MarkdownConverter) -> Self {
        self.markdown = markdown;
        self
    }

    fn rich_text(&self, recipe: &SourceRecipe, marker: &str) -> Result<String> {
        let element = recipe.required(marker)?;
        Ok(self.markdown.convert(&element.inner_html()))
    }

    fn photo(&self, recipe: &SourceRecipe) -> Result<Option<String>> {
        let Some(img) = recipe.select(PHOTO_SELECTOR)? else {
            return Ok(None);
        };
        let src = img
            .value()
            .attr("src")
            .ok_or_else(|| ConvertError::MissingAttribute {
                marker: PHOTO_SELECTOR.to_string(),
                attribute: "src".to_string(),
            })?;

        let path = self.source_dir.join(src.trim_start_matches('/'));
        let bytes = fs::read(&path).map_err(|e| ConvertError::io(&path, e))?;
        debug!("Embedding photo {} ({} bytes)", path.display(), bytes.len());

        Ok(Some(STANDARD.encode(bytes)))
    }
}

impl ConvertRecipe for PaprikaConverter {
    fn convert(&self, recipe: &SourceRecipe) -> Result<PaprikaRecipe> {
        let name = text(recipe.required("name")?);
        debug!("Converting recipe #{}: {}", recipe.index, name);

        let on_favorites =
            Favorite::from(content(recipe.required("recipeIsFavourite")?) == Some("True"));
        let rating = parse_rating(content(recipe.required("recipeRating")?));
        let servings = strip_servings_label(&text(recipe.required("recipeYield")?));
        let (source, source_url) = source_fields(recipe)?;

        let courses = values(recipe, "recipeCourse")?;
        let categories = values(recipe, "recipeCategory")?;
        let collections = values(recipe, "recipeCollection")?;
        let categories = build_categories(&courses, &categories, &collections, on_favorites);

        let times = parse_times(
            content(recipe.required("prepTime")?),
            content(recipe.required("cookTime")?),
        );

        Ok(PaprikaRecipe {
            name,
            servings,
            source,
            source_url,
            prep_time: times.prep_time,
            cook_time: times.cook_time,
            on_favorites,
            categories,
            nutritional_info: nutritional_info(recipe)?,
            difficulty: None,
            rating,
            notes: self.rich_text(recipe, "recipeNotes")?,
            photo: self.photo(recipe)?,
            ingredients: self.rich_text(recipe, "recipeIngredients")?,
            directions: self.rich_text(recipe, "recipeDirections")?,
            total_time: times.total_time,
        })
    }
}

/// Removes the first "servings" label (any case, optional colon) and trims.
pub fn strip_servings_label(raw: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `raw`
    let lowered = raw.to_ascii_lowercase();
    let Some(start) = lowered.find(SERVINGS_LABEL) else {
        return raw.trim().to_string();
    };

    let mut end = start + SERVINGS_LABEL.len();
    if raw[end..].starts_with(':') {
        end += 1;
    }

    format!("{}{}", &raw[..start], &raw[end..]).trim().to_string()
}

/// Reads the leading integer of a rating the way a lenient number parser
/// would ("4", " 4 stars"). Anything unreadable or negative rates 0.
pub fn parse_rating(raw: Option<&str>) -> u32 {
    let trimmed = raw.unwrap_or_default().trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();

    match digits.parse::<u32>() {
        Ok(_) if negative => 0,
        Ok(rating) => rating,
        Err(_) => {
            warn!("Unreadable rating {:?}, using 0", raw);
            0
        }
    }
}

/// Flattens courses, categories and collections into Paprika categories.
///
/// Every course is paired with every category ("Dinner - Quick"); with no
/// categories the courses stand alone. Collections and the favourites
/// marker follow.
pub fn build_categories(
    courses: &[String],
    categories: &[String],
    collections: &[String],
    favorite: Favorite,
) -> Vec<String> {
    let mut result = Vec::new();

    for course in courses {
        if categories.is_empty() {
            result.push(course.clone());
        } else {
            result.extend(
                categories
                    .iter()
                    .map(|category| format!("{course} - {category}")),
            );
        }
    }

    result.extend(
        collections
            .iter()
            .map(|collection| format!("(Collection) {collection}")),
    );

    // Paprika ignores on_favorites on import
    if favorite.is_yes() {
        result.push("(Favorites)".to_string());
    }

    result
}

fn values(recipe: &SourceRecipe, marker: &str) -> Result<Vec<String>> {
    Ok(recipe
        .all(marker)?
        .into_iter()
        .map(content_or_text)
        .collect())
}

fn nutritional_info(recipe: &SourceRecipe) -> Result<String> {
    let mut lines = Vec::new();

    for fact in &NUTRITION_FACTS {
        let marker = format!("recipeNut{}", fact.key);
        let value = recipe.marker(&marker)?.and_then(content);

        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!("{}: {}{}", fact.label, value, fact.unit));
        }
    }

    Ok(lines.join("\n"))
}

/// Returns `(source, source_url)`. A link yields its href and the href's
/// host without a leading "www."; plain text is used as the source as-is.
fn source_fields(recipe: &SourceRecipe) -> Result<(Option<String>, Option<String>)> {
    let element = recipe.required("recipeSource")?;
    let link_selector = crate::extractors::selector("a")?;

    let Some(link) = element.select(&link_selector).next() else {
        return Ok((Some(text(element)), None));
    };

    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| ConvertError::MissingAttribute {
            marker: "recipeSource a".to_string(),
            attribute: "href".to_string(),
        })?;
    let url = Url::parse(href).map_err(|source| ConvertError::InvalidSourceUrl {
        href: href.to_string(),
        source,
    })?;

    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    Ok((Some(host.to_string()), Some(href.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn recipe_html(extra: &str) -> String {
        format!(
            r#"
            <div class="recipe-details">
                <h2 itemprop="name">Tomato Soup</h2>
                <meta itemprop="recipeIsFavourite" content="True">
                <meta itemprop="recipeRating" content="4">
                <meta itemprop="prepTime" content="PT15M">
                <meta itemprop="cookTime" content="PT30M">
                <div>Servings: <span itemprop="recipeYield">Servings: 4</span></div>
                <div itemprop="recipeNotes"><p>Freezes well.</p></div>
                <div itemprop="recipeIngredients"><p>1 kg tomatoes</p><p>For the garnish:</p><p>basil</p></div>
                <div itemprop="recipeDirections"><p>Simmer.</p></div>
                {extra}
            </div>
            "#
        )
    }

    fn convert(html: &str) -> Result<PaprikaRecipe> {
        let document = Html::parse_document(html);
        let recipe = SourceRecipe::new(1, document.root_element());
        PaprikaConverter::new("/nonexistent").convert(&recipe)
    }

    #[test]
    fn test_servings_label() {
        assert_eq!(strip_servings_label("Servings: 4"), "4");
        assert_eq!(strip_servings_label("SERVINGS 6-8"), "6-8");
        assert_eq!(strip_servings_label("4 servings"), "4");
        assert_eq!(strip_servings_label("  12 muffins "), "12 muffins");
        assert_eq!(strip_servings_label(""), "");
    }

    #[test]
    fn test_rating() {
        assert_eq!(parse_rating(Some("4")), 4);
        assert_eq!(parse_rating(Some(" 5 stars")), 5);
        assert_eq!(parse_rating(Some("")), 0);
        assert_eq!(parse_rating(Some("n/a")), 0);
        assert_eq!(parse_rating(Some("-2")), 0);
        assert_eq!(parse_rating(None), 0);
    }

    #[test]
    fn test_categories_cross_product() {
        let result = build_categories(
            &strings(&["Breakfast"]),
            &strings(&["Quick", "Easy"]),
            &[],
            Favorite::No,
        );
        assert_eq!(result, strings(&["Breakfast - Quick", "Breakfast - Easy"]));
    }

    #[test]
    fn test_categories_course_fallback() {
        let result = build_categories(&strings(&["Dinner"]), &[], &[], Favorite::No);
        assert_eq!(result, strings(&["Dinner"]));
    }

    #[test]
    fn test_categories_favorites_only() {
        let result = build_categories(&[], &[], &[], Favorite::Yes);
        assert_eq!(result, strings(&["(Favorites)"]));
    }

    #[test]
    fn test_categories_full_order() {
        let result = build_categories(
            &strings(&["Lunch", "Dinner"]),
            &strings(&["Vegan"]),
            &strings(&["Weeknight", "Summer"]),
            Favorite::Yes,
        );
        assert_eq!(
            result,
            strings(&[
                "Lunch - Vegan",
                "Dinner - Vegan",
                "(Collection) Weeknight",
                "(Collection) Summer",
                "(Favorites)",
            ])
        );
    }

    #[test]
    fn test_categories_without_courses() {
        let result = build_categories(&[], &strings(&["Quick"]), &[], Favorite::No);
        assert!(result.is_empty());
    }

    #[test]
    fn test_convert_full_recipe() {
        let recipe = convert(&recipe_html(
            r#"
            <div itemprop="recipeSource"><a href="https://www.example.com/recipe/1">Example</a></div>
            <span itemprop="recipeCourse">Lunch</span>
            <meta itemprop="recipeCollection" content="Soups">
            <meta itemprop="recipeNutCalories" content="220">
            <meta itemprop="recipeNutTotalFat" content="">
            <meta itemprop="recipeNutSodium" content="450">
            "#,
        ))
        .unwrap();

        assert_eq!(recipe.name, "Tomato Soup");
        assert_eq!(recipe.servings, "4");
        assert_eq!(recipe.on_favorites, Favorite::Yes);
        assert_eq!(recipe.rating, 4);
        assert_eq!(recipe.source.as_deref(), Some("example.com"));
        assert_eq!(
            recipe.source_url.as_deref(),
            Some("https://www.example.com/recipe/1")
        );
        assert_eq!(
            recipe.categories,
            strings(&["Lunch", "(Collection) Soups", "(Favorites)"])
        );
        assert_eq!(recipe.nutritional_info, "Calories: 220\nSodium: 450mg");
        assert_eq!(recipe.prep_time.as_deref(), Some("15 minutes"));
        assert_eq!(recipe.cook_time.as_deref(), Some("30 minutes"));
        assert_eq!(recipe.total_time.as_deref(), Some("45 minutes"));
        assert_eq!(recipe.notes, "Freezes well.");
        assert_eq!(recipe.ingredients, "1 kg tomatoes\n\nFor the garnish:\nbasil");
        assert_eq!(recipe.directions, "Simmer.");
        assert_eq!(recipe.difficulty, None);
        assert_eq!(recipe.photo, None);
    }

    #[test]
    fn test_custom_markdown_converter() {
        let html = recipe_html(r#"<div itemprop="recipeSource"></div>"#).replace(
            "<p>Simmer.</p>",
            "<p>Simmer the <strong>sauce</strong>.</p><p>Serve.</p>",
        );
        let document = Html::parse_document(&html);
        let recipe = SourceRecipe::new(1, document.root_element());

        let recipe = PaprikaConverter::new("/nonexistent")
            .with_markdown(MarkdownConverter::default())
            .convert(&recipe)
            .unwrap();

        assert_eq!(recipe.directions, "Simmer the **sauce**.\n\nServe.");
    }

    #[test]
    fn test_plain_text_source() {
        let recipe = convert(&recipe_html(
            r#"<div itemprop="recipeSource">Grandma's cookbook</div>"#,
        ))
        .unwrap();

        assert_eq!(recipe.source.as_deref(), Some("Grandma's cookbook"));
        assert_eq!(recipe.source_url, None);
        assert_eq!(recipe.nutritional_info, "");
    }

    #[test]
    fn test_only_leading_www_is_stripped() {
        let recipe = convert(&recipe_html(
            r#"<div itemprop="recipeSource"><a href="http://blog.www.example.org/x">x</a></div>"#,
        ))
        .unwrap();
        assert_eq!(recipe.source.as_deref(), Some("blog.www.example.org"));

        let recipe = convert(&recipe_html(
            r#"<div itemprop="recipeSource"><a href="https://cooking.example.com/x">x</a></div>"#,
        ))
        .unwrap();
        assert_eq!(recipe.source.as_deref(), Some("cooking.example.com"));
    }

    #[test]
    fn test_relative_source_link_is_fatal() {
        let result = convert(&recipe_html(
            r#"<div itemprop="recipeSource"><a href="/recipes/1">x</a></div>"#,
        ));
        assert!(matches!(result, Err(ConvertError::InvalidSourceUrl { .. })));
    }

    #[test]
    fn test_not_favourite_unless_exactly_true() {
        let html = recipe_html(r#"<div itemprop="recipeSource"></div>"#)
            .replace(r#"content="True""#, r#"content="true""#);
        let recipe = convert(&html).unwrap();

        assert_eq!(recipe.on_favorites, Favorite::No);
        assert!(recipe.categories.is_empty());
    }

    #[test]
    fn test_missing_photo_file_is_fatal() {
        let result = convert(&recipe_html(
            r#"
            <div itemprop="recipeSource"></div>
            <div class="recipe-photos-div"><img src="images/soup.jpg"></div>
            "#,
        ));
        assert!(matches!(result, Err(ConvertError::Io { .. })));
    }
}
