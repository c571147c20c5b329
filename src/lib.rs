//! # Recipe Ranger - shared crafting catalog bot
//!
//! Recipe Ranger lets a group of users maintain a catalog of craftable items,
//! each defined by a list of raw-ingredient quantities, and work out what it
//! takes to craft `N` of them using shared per-ingredient prices and each
//! user's own ingredient inventory.
//!
//! ## Features
//!
//! - **Catalog**: add, update, list and delete items with ordered recipes.
//! - **Cost Reports**: scaled ingredient breakdowns with per-line and total cost;
//!   unpriced ingredients are reported separately from free ones.
//! - **Dialogs**: multi-message edits (collect ingredients until `done`,
//!   confirm a delete, enter a new price) keyed by user and channel, with an
//!   idle timeout.
//! - **Price Editor**: a paged ingredient price list with one edit control per entry.
//! - **Inventories**: per-user ingredient quantities.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reciperanger::bot::{InboundEvent, RecipeBot};
//! use reciperanger::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut bot = RecipeBot::open(config)?;
//!     for panel in bot.handle_event(&InboundEvent::text("alice", "kitchen", "!list-items")) {
//!         print!("{}", panel.render_text());
//!     }
//!     bot.shutdown()
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - command front-end, handlers, panels and the run loop
//! - [`crafting`] - records, store, cost engine, pagination and dialogs
//! - [`config`] - configuration management and validation
//! - [`validation`] - input validation at the command boundary
//! - [`logutil`] - single-line log escaping
//! - [`metrics`] - in-process counters

pub mod bot;
pub mod config;
pub mod crafting;
pub mod logutil;
pub mod metrics;
pub mod validation;
