use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

pub const ITEM_SCHEMA_VERSION: u8 = 1;
pub const COST_SCHEMA_VERSION: u8 = 1;
pub const INVENTORY_SCHEMA_VERSION: u8 = 1;

/// One `(quantity, ingredient)` pair of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub quantity: u32,
    pub ingredient: String,
}

impl RecipeLine {
    pub fn new(quantity: u32, ingredient: impl Into<String>) -> Self {
        Self {
            quantity,
            ingredient: ingredient.into(),
        }
    }
}

impl fmt::Display for RecipeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.ingredient)
    }
}

/// A craftable catalog entry.
///
/// The recipe is persisted as its canonical text (`"5 sugar, 2 flour"`).
/// Items created through the add flow always hold well-formed text; the
/// update flow stores the user's replacement verbatim, so [`Item::recipe`]
/// re-validates on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub ingredients: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        recipe: &[RecipeLine],
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            ingredients: validation::format_recipe(recipe),
            description: description.into(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }

    /// Ordered recipe lines parsed from the stored ingredient text.
    pub fn recipe(&self) -> Result<Vec<RecipeLine>, ValidationError> {
        validation::parse_recipe_text(&self.ingredients)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Unit price for one ingredient, keyed by normalized ingredient name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientCost {
    pub ingredient: String,
    pub cost_per_unit: f64,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl IngredientCost {
    pub fn new(ingredient: impl Into<String>, cost_per_unit: f64) -> Self {
        Self {
            ingredient: ingredient.into(),
            cost_per_unit,
            updated_at: Utc::now(),
            schema_version: COST_SCHEMA_VERSION,
        }
    }
}

/// How much of an ingredient one user holds, keyed by `(user_id, ingredient)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInventory {
    pub user_id: String,
    pub ingredient: String,
    pub quantity: f64,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl UserInventory {
    pub fn new(user_id: impl Into<String>, ingredient: impl Into<String>, quantity: f64) -> Self {
        Self {
            user_id: user_id.into(),
            ingredient: ingredient.into(),
            quantity,
            updated_at: Utc::now(),
            schema_version: INVENTORY_SCHEMA_VERSION,
        }
    }
}

/// Whether an upsert created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}
