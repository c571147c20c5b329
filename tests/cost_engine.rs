//! Integration tests for the cost calculation engine against a real price table.

use reciperanger::crafting::{compute_cost, CraftError, Item, LineCost, RecipeLine};
use reciperanger::validation::{self, ValidationError};

mod common;

fn potion() -> Item {
    let recipe = validation::parse_recipe_text("3 herb, 1 vial").expect("recipe");
    Item::new("potion", &recipe, "heals", "alice")
}

#[test]
fn potion_for_four() {
    let (_dir, store) = common::temp_store();
    store.set_ingredient_cost("herb", 2.0).unwrap();
    store.set_ingredient_cost("vial", 5.0).unwrap();
    let prices = store.price_table().unwrap();

    let report = compute_cost(&potion(), 4, |i| prices.get(i).copied()).expect("report");
    assert_eq!(report.requested, 4);
    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].ingredient, "herb");
    assert_eq!(report.lines[0].needed, 12);
    assert_eq!(
        report.lines[0].cost,
        LineCost::Priced {
            unit_cost: 2.0,
            total: 24.0
        }
    );
    assert_eq!(report.lines[1].needed, 4);
    assert_eq!(report.lines[0].to_string(), "12x herb @ $2.00 = $24.00");
    assert_eq!(report.lines[1].to_string(), "4x vial @ $5.00 = $20.00");
    assert_eq!(report.total_cost, 44.0);
}

#[test]
fn needed_quantities_scale_exactly() {
    let recipe = vec![
        RecipeLine::new(7, "iron ore"),
        RecipeLine::new(1, "coal"),
        RecipeLine::new(250, "sand"),
    ];
    let item = Item::new("steel", &recipe, "", "alice");
    for q in [1_i64, 2, 13, 1000] {
        let report = compute_cost(&item, q, |_| Some(0.25)).unwrap();
        for (line, base) in report.lines.iter().zip(&recipe) {
            assert_eq!(line.ingredient, base.ingredient);
            assert_eq!(line.needed, u64::from(base.quantity) * q as u64);
        }
        let sum: f64 = report
            .lines
            .iter()
            .map(|l| match l.cost {
                LineCost::Priced { total, .. } => total,
                LineCost::Unset => 0.0,
            })
            .sum();
        assert_eq!(report.total_cost, sum);
    }
}

#[test]
fn unpriced_lines_are_reported_not_counted() {
    let (_dir, store) = common::temp_store();
    store.set_ingredient_cost("vial", 0.0).unwrap();
    let prices = store.price_table().unwrap();

    let report = compute_cost(&potion(), 1, |i| prices.get(i).copied()).unwrap();
    assert_eq!(report.lines[0].cost, LineCost::Unset);
    assert_eq!(report.lines[0].to_string(), "3x herb (cost not set)");
    assert!(report.lines[1].is_priced());
    assert_eq!(report.total_cost, 0.0);
    assert!(report.has_any_price());
    let unpriced: Vec<&str> = report.unpriced().map(|l| l.ingredient.as_str()).collect();
    assert_eq!(unpriced, vec!["herb"]);
}

#[test]
fn non_positive_quantities_rejected() {
    for q in [0_i64, -3] {
        let err = compute_cost(&potion(), q, |_| Some(1.0)).unwrap_err();
        assert!(matches!(
            err,
            CraftError::Validation(ValidationError::InvalidQuantity { .. })
        ));
    }
}

#[test]
fn quantity_that_overflows_the_scaled_amount_is_rejected() {
    let err = compute_cost(&potion(), i64::MAX, |_| Some(1.0)).unwrap_err();
    assert!(matches!(
        err,
        CraftError::Validation(ValidationError::InvalidQuantity { .. })
    ));

    // The largest quantity that still fits scales exactly
    let single = Item::new("pebble", &[RecipeLine::new(1, "stone")], "", "alice");
    let report = compute_cost(&single, i64::MAX, |_| None).unwrap();
    assert_eq!(report.lines[0].needed, i64::MAX as u64);
}

#[test]
fn malformed_stored_text_is_an_error() {
    let mut item = potion();
    item.ingredients = "3 herb, a splash of vial".to_string();
    let err = compute_cost(&item, 1, |_| Some(1.0)).unwrap_err();
    assert!(matches!(
        err,
        CraftError::Validation(ValidationError::InvalidRecipeLine { ref line }) if line == "a splash of vial"
    ));
}
