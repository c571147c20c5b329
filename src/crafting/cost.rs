//! Cost calculation for crafting `N` units of an item.
//!
//! [`compute_cost`] is pure: it takes the item, the requested quantity and a
//! price lookup, and returns a [`CostReport`] without touching the store.
//! Line order follows the recipe and the running total is accumulated in that
//! same order, so floating-point results are reproducible.

use std::fmt;

use crate::crafting::errors::CraftError;
use crate::crafting::types::Item;
use crate::validation::ValidationError;

/// Priced or unpriced outcome for one recipe line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineCost {
    Priced { unit_cost: f64, total: f64 },
    /// No cost has ever been set for the ingredient. Distinct from a zero price.
    Unset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostLine {
    pub ingredient: String,
    pub needed: u64,
    pub cost: LineCost,
}

impl CostLine {
    pub fn is_priced(&self) -> bool {
        matches!(self.cost, LineCost::Priced { .. })
    }
}

impl fmt::Display for CostLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cost {
            LineCost::Priced { unit_cost, total } => write!(
                f,
                "{}x {} @ ${:.2} = ${:.2}",
                self.needed, self.ingredient, unit_cost, total
            ),
            LineCost::Unset => write!(f, "{}x {} (cost not set)", self.needed, self.ingredient),
        }
    }
}

/// Per-ingredient and total breakdown for one item and quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CostReport {
    pub item: String,
    pub requested: u64,
    pub lines: Vec<CostLine>,
    pub total_cost: f64,
}

impl CostReport {
    pub fn unpriced(&self) -> impl Iterator<Item = &CostLine> {
        self.lines.iter().filter(|l| !l.is_priced())
    }

    pub fn has_any_price(&self) -> bool {
        self.lines.iter().any(CostLine::is_priced)
    }
}

/// Scale `item`'s recipe by `requested` and price each line with `price_of`.
///
/// Rejects a non-positive quantity with `InvalidQuantity` before any work,
/// and malformed stored recipe text with `InvalidRecipeLine`. A quantity
/// whose scaled amount does not fit in a `u64` is also `InvalidQuantity`.
pub fn compute_cost<F>(item: &Item, requested: i64, price_of: F) -> Result<CostReport, CraftError>
where
    F: Fn(&str) -> Option<f64>,
{
    if requested <= 0 {
        return Err(ValidationError::InvalidQuantity {
            value: requested.to_string(),
        }
        .into());
    }
    let too_large = || ValidationError::InvalidQuantity {
        value: requested.to_string(),
    };
    let requested = u64::try_from(requested).map_err(|_| too_large())?;
    let recipe = item.recipe()?;

    let mut total_cost = 0.0_f64;
    let mut lines = Vec::with_capacity(recipe.len());
    for line in recipe {
        let needed = u64::from(line.quantity)
            .checked_mul(requested)
            .ok_or_else(too_large)?;
        let cost = match price_of(&line.ingredient) {
            Some(unit_cost) => {
                let total = needed as f64 * unit_cost;
                total_cost += total;
                LineCost::Priced { unit_cost, total }
            }
            None => LineCost::Unset,
        };
        lines.push(CostLine {
            ingredient: line.ingredient,
            needed,
            cost,
        });
    }

    Ok(CostReport {
        item: item.name.clone(),
        requested,
        lines,
        total_cost,
    })
}
