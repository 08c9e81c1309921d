//! Category table the assignment engine draws from.
//!
//! The table is plain data: a built-in default, or a JSON file named by
//! `CATALOG_PATH`. Adding a category never touches engine code.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has no categories")]
    Empty,

    #[error("Category '{0}' has no items")]
    EmptyCategory(String),

    #[error("Duplicate category '{0}'")]
    DuplicateCategory(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Movies",
        &[
            "The Shawshank Redemption",
            "The Godfather",
            "The Dark Knight",
            "Pulp Fiction",
            "Forrest Gump",
            "Inception",
            "The Matrix",
            "Goodfellas",
            "The Silence of the Lambs",
            "Fight Club",
        ],
    ),
    (
        "Songs",
        &[
            "Bohemian Rhapsody",
            "Stairway to Heaven",
            "Billie Jean",
            "Sweet Child O' Mine",
            "Smells Like Teen Spirit",
            "Hotel California",
            "Sweet Home Alabama",
            "Sweet Caroline",
            "Don't Stop Believin'",
            "Sweet Dreams",
        ],
    ),
    (
        "Artists",
        &[
            "Michael Jackson",
            "Elvis Presley",
            "Madonna",
            "Prince",
            "David Bowie",
            "Freddie Mercury",
            "John Lennon",
            "Bob Marley",
            "Miles Davis",
            "Louis Armstrong",
        ],
    ),
    (
        "Historical Figures",
        &[
            "Albert Einstein",
            "Mahatma Gandhi",
            "Martin Luther King Jr.",
            "Winston Churchill",
            "Nelson Mandela",
            "Mother Teresa",
            "Leonardo da Vinci",
            "William Shakespeare",
            "Isaac Newton",
            "Marie Curie",
        ],
    ),
];

impl Catalog {
    /// Build a catalog, rejecting empty tables, empty pools and duplicate names
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if category.items.is_empty() {
                return Err(CatalogError::EmptyCategory(category.name.clone()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.name.clone()));
            }
        }

        Ok(Self { categories })
    }

    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(name, items)| Category {
                name: name.to_string(),
                items: items.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        Self::new(categories)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
