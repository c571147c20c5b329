use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use sled::IVec;

use crate::crafting::errors::CraftError;
use crate::crafting::types::{
    IngredientCost, Item, Upsert, UserInventory, COST_SCHEMA_VERSION, INVENTORY_SCHEMA_VERSION,
    ITEM_SCHEMA_VERSION,
};
use crate::logutil::escape_log;

const TREE_ITEMS: &str = "items";
const TREE_COSTS: &str = "ingredient_costs";
const TREE_INVENTORY: &str = "user_ingredients";

/// Separates the user id from the ingredient name in inventory keys.
const INVENTORY_KEY_SEP: u8 = 0x00;

/// Records that carry a schema version checked on every read.
trait Versioned {
    const ENTITY: &'static str;
    const VERSION: u8;
    fn schema_version(&self) -> u8;
}

impl Versioned for Item {
    const ENTITY: &'static str = "item";
    const VERSION: u8 = ITEM_SCHEMA_VERSION;
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
}

impl Versioned for IngredientCost {
    const ENTITY: &'static str = "ingredient cost";
    const VERSION: u8 = COST_SCHEMA_VERSION;
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
}

impl Versioned for UserInventory {
    const ENTITY: &'static str = "inventory";
    const VERSION: u8 = INVENTORY_SCHEMA_VERSION;
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
}

/// Opens a catalog at an explicit path, optionally as a scratch database.
pub struct CatalogStoreBuilder {
    path: PathBuf,
    temporary: bool,
}

impl CatalogStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    /// Remove the database files when the store is dropped.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn open(self) -> Result<CatalogStore, CraftError> {
        CatalogStore::open_with_options(self.path, self.temporary)
    }
}

/// Sled-backed persistence for items, ingredient prices and user inventories.
///
/// Opened once at startup and passed by reference to every handler.
/// Keys are case-folded here as well as at the validation boundary, so a
/// caller that forgets to normalise still hits the same record.
pub struct CatalogStore {
    db: sled::Db,
    items: sled::Tree,
    costs: sled::Tree,
    inventory: sled::Tree,
}

impl CatalogStore {
    /// Open (or create) the catalog rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CraftError> {
        Self::open_with_options(path, false)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, temporary: bool) -> Result<Self, CraftError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::Config::new()
            .path(path_ref)
            .temporary(temporary)
            .open()?;
        let items = db.open_tree(TREE_ITEMS)?;
        let costs = db.open_tree(TREE_COSTS)?;
        let inventory = db.open_tree(TREE_INVENTORY)?;
        debug!(target: "reciperanger::store", "opened catalog at {}", path_ref.display());
        Ok(Self {
            db,
            items,
            costs,
            inventory,
        })
    }

    fn name_key(name: &str) -> Vec<u8> {
        name.trim().to_lowercase().into_bytes()
    }

    fn inventory_prefix(user_id: &str) -> Vec<u8> {
        let mut key = user_id.as_bytes().to_vec();
        key.push(INVENTORY_KEY_SEP);
        key
    }

    fn inventory_key(user_id: &str, ingredient: &str) -> Vec<u8> {
        let mut key = Self::inventory_prefix(user_id);
        key.extend_from_slice(&Self::name_key(ingredient));
        key
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CraftError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T>(bytes: IVec) -> Result<T, CraftError>
    where
        T: serde::de::DeserializeOwned + Versioned,
    {
        let record: T = bincode::deserialize(&bytes)?;
        if record.schema_version() != T::VERSION {
            return Err(CraftError::SchemaMismatch {
                entity: T::ENTITY,
                expected: T::VERSION,
                found: record.schema_version(),
            });
        }
        Ok(record)
    }

    fn collect<T, I>(iter: I) -> Result<Vec<T>, CraftError>
    where
        T: serde::de::DeserializeOwned + Versioned,
        I: Iterator<Item = sled::Result<(IVec, IVec)>>,
    {
        iter.map(|entry| {
            entry
                .map_err(CraftError::from)
                .and_then(|(_key, value)| Self::deserialize(value))
        })
        .collect()
    }

    // ---- items ----

    /// Insert a new item; fails with [`CraftError::DuplicateKey`] when the name is taken.
    ///
    /// The whole record goes in with a single compare-and-swap, so a failed
    /// insert leaves nothing behind.
    pub fn insert_item(&self, mut item: Item) -> Result<(), CraftError> {
        item.schema_version = ITEM_SCHEMA_VERSION;
        let key = Self::name_key(&item.name);
        let bytes = Self::serialize(&item)?;
        match self
            .items
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => {
                self.items.flush()?;
                debug!(target: "reciperanger::store", "item inserted: {}", escape_log(&item.name));
                Ok(())
            }
            Err(_) => Err(CraftError::DuplicateKey(item.name)),
        }
    }

    /// Fetch an item by case-insensitive name.
    pub fn get_item(&self, name: &str) -> Result<Item, CraftError> {
        let Some(bytes) = self.items.get(Self::name_key(name))? else {
            return Err(CraftError::NotFound(format!("Item '{}'", name.trim())));
        };
        Self::deserialize(bytes)
    }

    /// Replace an item's stored ingredient text verbatim.
    pub fn update_item_ingredients(&self, name: &str, ingredients: &str) -> Result<Item, CraftError> {
        let mut item = self.get_item(name)?;
        item.ingredients = ingredients.to_string();
        item.touch();
        let bytes = Self::serialize(&item)?;
        self.items.insert(Self::name_key(&item.name), bytes)?;
        self.items.flush()?;
        debug!(target: "reciperanger::store", "item updated: {}", escape_log(&item.name));
        Ok(item)
    }

    /// Delete an item, returning the removed record.
    pub fn delete_item(&self, name: &str) -> Result<Item, CraftError> {
        let Some(bytes) = self.items.remove(Self::name_key(name))? else {
            return Err(CraftError::NotFound(format!("Item '{}'", name.trim())));
        };
        self.items.flush()?;
        let item: Item = Self::deserialize(bytes)?;
        debug!(target: "reciperanger::store", "item deleted: {}", escape_log(&item.name));
        Ok(item)
    }

    /// All items in name order.
    pub fn list_items(&self) -> Result<Vec<Item>, CraftError> {
        Self::collect(self.items.iter())
    }

    pub fn count_items(&self) -> usize {
        self.items.len()
    }

    // ---- ingredient costs ----

    /// Insert or replace the unit cost for an ingredient. Never creates duplicates.
    pub fn set_ingredient_cost(&self, ingredient: &str, cost_per_unit: f64) -> Result<Upsert, CraftError> {
        let record = IngredientCost::new(ingredient.trim().to_lowercase(), cost_per_unit);
        let bytes = Self::serialize(&record)?;
        let previous = self.costs.insert(Self::name_key(ingredient), bytes)?;
        self.costs.flush()?;
        Ok(match previous {
            Some(_) => Upsert::Updated,
            None => Upsert::Inserted,
        })
    }

    /// Look up an ingredient's unit cost; `None` means the cost has never been set.
    pub fn find_ingredient_cost(&self, ingredient: &str) -> Result<Option<IngredientCost>, CraftError> {
        self.costs
            .get(Self::name_key(ingredient))?
            .map(Self::deserialize)
            .transpose()
    }

    /// All ingredient costs in name order.
    pub fn list_ingredient_costs(&self) -> Result<Vec<IngredientCost>, CraftError> {
        Self::collect(self.costs.iter())
    }

    /// Snapshot of every known unit cost keyed by ingredient name.
    pub fn price_table(&self) -> Result<HashMap<String, f64>, CraftError> {
        Ok(self
            .list_ingredient_costs()?
            .into_iter()
            .map(|c| (c.ingredient, c.cost_per_unit))
            .collect())
    }

    pub fn count_ingredient_costs(&self) -> usize {
        self.costs.len()
    }

    // ---- user inventories ----

    /// Insert or replace how much of an ingredient a user holds.
    pub fn set_user_quantity(
        &self,
        user_id: &str,
        ingredient: &str,
        quantity: f64,
    ) -> Result<Upsert, CraftError> {
        let record = UserInventory::new(user_id, ingredient.trim().to_lowercase(), quantity);
        let bytes = Self::serialize(&record)?;
        let previous = self
            .inventory
            .insert(Self::inventory_key(user_id, ingredient), bytes)?;
        self.inventory.flush()?;
        Ok(match previous {
            Some(_) => Upsert::Updated,
            None => Upsert::Inserted,
        })
    }

    pub fn get_user_quantity(
        &self,
        user_id: &str,
        ingredient: &str,
    ) -> Result<Option<UserInventory>, CraftError> {
        self.inventory
            .get(Self::inventory_key(user_id, ingredient))?
            .map(Self::deserialize)
            .transpose()
    }

    /// Every inventory entry for one user, in ingredient name order.
    pub fn list_user_inventory(&self, user_id: &str) -> Result<Vec<UserInventory>, CraftError> {
        Self::collect(self.inventory.scan_prefix(Self::inventory_prefix(user_id)))
    }

    /// Flush all pending writes; called on shutdown.
    pub fn flush(&self) -> Result<(), CraftError> {
        self.db.flush()?;
        Ok(())
    }
}
