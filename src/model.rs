use serde::Serialize;

/// Paprika's yes/no flag for favourite recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Favorite {
    Yes,
    #[default]
    No,
}

impl Favorite {
    pub fn is_yes(self) -> bool {
        self == Favorite::Yes
    }
}

impl From<bool> for Favorite {
    fn from(value: bool) -> Self {
        if value {
            Favorite::Yes
        } else {
            Favorite::No
        }
    }
}

/// One recipe in Paprika's YAML import format.
///
/// Field order is the key order of the emitted YAML mapping; `total_time`
/// trails the record the way Paprika exports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaprikaRecipe {
    pub name: String,
    pub servings: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    pub on_favorites: Favorite,
    pub categories: Vec<String>,
    pub nutritional_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub rating: u32,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub ingredients: String,
    pub directions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
}
