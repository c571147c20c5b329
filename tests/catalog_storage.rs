//! Integration tests for the sled-backed catalog store
//!
//! - item CRUD and case-insensitive keys
//! - ingredient cost upserts never duplicate
//! - per-user inventories

use reciperanger::crafting::{CatalogStore, CraftError, Item, RecipeLine, Upsert};
use reciperanger::validation;

mod common;

#[test]
fn item_crud_operations() {
    let (_dir, store) = common::temp_store();
    let recipe = vec![RecipeLine::new(5, "sugar"), RecipeLine::new(2, "flour")];
    store
        .insert_item(Item::new("cake", &recipe, "cake", "alice"))
        .expect("insert");

    let fetched = store.get_item("Cake").expect("get");
    assert_eq!(fetched.ingredients, "5 sugar, 2 flour");
    assert_eq!(fetched.recipe().expect("recipe"), recipe);
    assert_eq!(fetched.created_by, "alice");

    // Replacement text is stored verbatim, even when it does not parse
    let updated = store
        .update_item_ingredients("CAKE", "eggs and some love")
        .expect("update");
    assert_eq!(updated.ingredients, "eggs and some love");
    assert!(updated.updated_at >= fetched.updated_at);
    assert!(store.get_item("cake").unwrap().recipe().is_err());

    let removed = store.delete_item("cake").expect("delete");
    assert_eq!(removed.name, "cake");
    assert!(matches!(store.get_item("cake"), Err(CraftError::NotFound(_))));
    assert_eq!(store.count_items(), 0);
}

#[test]
fn duplicate_insert_leaves_original_untouched() {
    let (_dir, store) = common::temp_store();
    store
        .insert_item(Item::new("pie", &[RecipeLine::new(1, "apple")], "first", "alice"))
        .unwrap();
    let err = store
        .insert_item(Item::new("pie", &[RecipeLine::new(9, "pear")], "second", "bob"))
        .unwrap_err();
    assert!(matches!(err, CraftError::DuplicateKey(_)));
    assert_eq!(
        err.to_string(),
        "Item 'pie' already exists. Try updating it instead."
    );
    let pie = store.get_item("pie").unwrap();
    assert_eq!(pie.description, "first");
    assert_eq!(pie.ingredients, "1 apple");
}

#[test]
fn items_list_in_name_order() {
    let (_dir, store) = common::temp_store();
    for name in ["stew", "bread", "jam"] {
        store
            .insert_item(Item::new(name, &[RecipeLine::new(1, "water")], "", "alice"))
            .unwrap();
    }
    let names: Vec<String> = store.list_items().unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["bread", "jam", "stew"]);
}

#[test]
fn setting_a_cost_twice_keeps_one_record() {
    let (_dir, store) = common::temp_store();
    assert_eq!(store.set_ingredient_cost("herb", 2.0).unwrap(), Upsert::Inserted);
    assert_eq!(store.set_ingredient_cost("Herb", 3.5).unwrap(), Upsert::Updated);
    assert_eq!(store.count_ingredient_costs(), 1);
    let herb = store.find_ingredient_cost("herb").unwrap().expect("herb");
    assert_eq!(herb.cost_per_unit, 3.5);
    assert_eq!(herb.ingredient, "herb");
}

#[test]
fn zero_cost_is_a_real_price() {
    let (_dir, store) = common::temp_store();
    store.set_ingredient_cost("water", 0.0).unwrap();
    let table = store.price_table().unwrap();
    assert_eq!(table.get("water"), Some(&0.0));
    assert_eq!(table.get("salt"), None);
}

#[test]
fn inventories_upsert_per_user() {
    let (_dir, store) = common::temp_store();
    assert_eq!(store.set_user_quantity("alice", "herb", 3.0).unwrap(), Upsert::Inserted);
    assert_eq!(store.set_user_quantity("alice", "herb", 0.0).unwrap(), Upsert::Updated);
    store.set_user_quantity("bob", "herb", 7.5).unwrap();

    assert_eq!(store.get_user_quantity("alice", "herb").unwrap().unwrap().quantity, 0.0);
    assert_eq!(store.get_user_quantity("bob", "herb").unwrap().unwrap().quantity, 7.5);
    assert!(store.get_user_quantity("carol", "herb").unwrap().is_none());
    assert_eq!(store.list_user_inventory("alice").unwrap().len(), 1);
    assert!(store.list_user_inventory("carol").unwrap().is_empty());
}

#[test]
fn catalog_reopens_with_data() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("catalog");
    {
        let store = CatalogStore::open(&path).unwrap();
        let recipe = validation::parse_recipe_text("3 herb, 1 vial").unwrap();
        store
            .insert_item(Item::new("potion", &recipe, "heals", "alice"))
            .unwrap();
        store.flush().unwrap();
    }
    let store = CatalogStore::open(&path).unwrap();
    assert_eq!(store.get_item("potion").unwrap().ingredients, "3 herb, 1 vial");
}
