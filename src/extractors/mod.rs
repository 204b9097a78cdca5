use crate::error::{ConvertError, Result};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;

mod recipe_keeper;

pub use self::recipe_keeper::{RecipeKeeperExtractor, REQUIRED_MARKERS};

pub trait Extractor {
    /// Finds every recipe in the document, in document order.
    fn extract<'a>(&self, document: &'a Html) -> Result<Vec<SourceRecipe<'a>>>;
}

/// Reads and parses an HTML export.
pub fn load_document(path: &Path) -> Result<Html> {
    let body = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    debug!("Read {} bytes from {}", body.len(), path.display());
    Ok(Html::parse_document(&body))
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ConvertError::Selector(format!("{css}: {e}")))
}

/// One recipe node of a parsed export, queried by `itemprop` marker.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecipe<'a> {
    /// 1-based position of the recipe in the export
    pub index: usize,
    element: ElementRef<'a>,
}

impl<'a> SourceRecipe<'a> {
    pub fn new(index: usize, element: ElementRef<'a>) -> Self {
        Self { index, element }
    }

    /// First element carrying the marker, if any.
    pub fn marker(&self, name: &str) -> Result<Option<ElementRef<'a>>> {
        self.select(&marker_selector(name))
    }

    /// First element carrying the marker; its absence is fatal.
    pub fn required(&self, name: &str) -> Result<ElementRef<'a>> {
        self.marker(name)?.ok_or_else(|| ConvertError::MissingMarker {
            recipe: self.index,
            marker: name.to_string(),
        })
    }

    /// Every element carrying the marker, in document order.
    pub fn all(&self, name: &str) -> Result<Vec<ElementRef<'a>>> {
        let selector = selector(&marker_selector(name))?;
        Ok(self.element.select(&selector).collect())
    }

    /// First descendant matching an arbitrary CSS selector.
    pub fn select(&self, css: &str) -> Result<Option<ElementRef<'a>>> {
        let selector = selector(css)?;
        Ok(self.element.select(&selector).next())
    }
}

fn marker_selector(name: &str) -> String {
    format!("[itemprop=\"{name}\"]")
}

/// Concatenated text content of an element, untrimmed.
pub fn text(element: ElementRef) -> String {
    element.text().collect()
}

/// The `content` attribute of an element.
pub fn content<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element.value().attr("content")
}

/// The `content` attribute when present (even if empty), otherwise the text.
pub fn content_or_text(element: ElementRef) -> String {
    match content(element) {
        Some(value) => value.to_string(),
        None => text(element),
    }
}
