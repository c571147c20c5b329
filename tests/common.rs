//! Test utilities & fixtures.
//! Every fixture lives in its own temp dir; keep the `TempDir` alive for the test's duration.

use reciperanger::bot::{InboundEvent, Panel, RecipeBot};
use reciperanger::config::Config;
use reciperanger::crafting::{CatalogStore, CatalogStoreBuilder};
use tempfile::TempDir;

/// A fresh catalog in a temp dir.
#[allow(dead_code)]
pub fn temp_store() -> (TempDir, CatalogStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = CatalogStoreBuilder::new(dir.path().join("catalog"))
        .temporary()
        .open()
        .expect("store");
    (dir, store)
}

/// A bot with default settings whose catalog lives in a temp dir.
#[allow(dead_code)]
pub fn test_bot() -> (TempDir, RecipeBot) {
    test_bot_with(|_| {})
}

#[allow(dead_code)]
pub fn test_bot_with(tweak: impl FnOnce(&mut Config)) -> (TempDir, RecipeBot) {
    let dir = TempDir::new().expect("tempdir");
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_string_lossy().to_string();
    config.logging.file = None;
    tweak(&mut config);
    let bot = RecipeBot::open(config).expect("bot");
    (dir, bot)
}

#[allow(dead_code)]
pub fn say(bot: &mut RecipeBot, author: &str, channel: &str, text: &str) -> Vec<Panel> {
    bot.handle_event(&InboundEvent::text(author, channel, text))
}

#[allow(dead_code)]
pub fn select(bot: &mut RecipeBot, author: &str, channel: &str, control_id: &str) -> Vec<Panel> {
    bot.handle_event(&InboundEvent::selection(author, channel, control_id))
}

/// Unwrap a reply that must be exactly one panel.
#[allow(dead_code)]
pub fn only(mut panels: Vec<Panel>) -> Panel {
    assert_eq!(panels.len(), 1, "expected one panel, got {:?}", panels);
    panels.remove(0)
}

/// Add an item through the full add-item dialog.
#[allow(dead_code)]
pub fn add_item(bot: &mut RecipeBot, author: &str, name: &str, description: &str, lines: &[&str]) {
    let channel = "workshop";
    say(bot, author, channel, &format!("!add-item {} | {}", name, description));
    for line in lines {
        say(bot, author, channel, line);
    }
    let done = only(say(bot, author, channel, "done"));
    assert_eq!(done.title, "Item Added", "add-item failed: {:?}", done);
}
