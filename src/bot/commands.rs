//! Command handlers and dialog resolution.
//!
//! Every handler either performs a single store operation and answers with
//! panels, or opens a dialog in the [`SessionTable`] and answers with a
//! prompt. Dialog replies come back through [`CommandProcessor::resolve`],
//! which applies the committed payload to the store. Handlers return
//! `Err(CraftError)` for anything the user should see as an error; the
//! caller renders it and no store mutation has happened.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::bot::help::help_panel;
use crate::bot::panel::{ControlAction, Panel};
use crate::bot::parser::CommandName;
use crate::config::BotConfig;
use crate::crafting::cost::{compute_cost, CostReport, LineCost};
use crate::crafting::pagination::{Direction, PaginationState, PriceEntry};
use crate::crafting::session::{
    Choice, Input, Outcome, Payload, Routed, Session, SessionKind, SessionTable, CANCEL_TOKEN,
    DONE_TOKEN,
};
use crate::crafting::storage::CatalogStore;
use crate::crafting::types::{Item, Upsert};
use crate::crafting::CraftError;
use crate::logutil::escape_log;
use crate::validation::{self, ValidationError};

/// Everything a handler may touch while serving one event.
pub struct CommandContext<'a> {
    pub store: &'a CatalogStore,
    pub sessions: &'a mut SessionTable,
    pub bot: &'a BotConfig,
    pub author: &'a str,
    pub channel: &'a str,
    pub now: DateTime<Utc>,
}

impl CommandContext<'_> {
    fn usage(&self, command: CommandName) -> String {
        command.usage(&self.bot.command_prefix)
    }

    fn start(&mut self, kind: SessionKind, target: &str) -> Result<(), CraftError> {
        self.sessions
            .start_at(self.author, self.channel, kind, target, self.now)
            .map(|_| ())
    }
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

/// "healing potion" -> "Healing Potion", for headings only; keys stay lower-case.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn require_args<'a>(args: &'a str, usage: String) -> Result<&'a str, ValidationError> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingArguments { usage });
    }
    Ok(trimmed)
}

/// Progress panel re-rendered after each accepted ingredient line.
pub fn collection_progress(session: &Session) -> Panel {
    let lines = if session.collected.is_empty() {
        "(none yet)".to_string()
    } else {
        session
            .collected
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };
    Panel::info(format!("Adding Ingredients for {}", title_case(&session.target))).with_description(
        format!(
            "Current ingredients:\n{}\n\nType '{}' when finished or '{}' to stop.",
            lines, DONE_TOKEN, CANCEL_TOKEN
        ),
    )
}

pub fn cancel_notice(session: &Session) -> Panel {
    let message = match session.kind {
        SessionKind::CollectIngredients { .. } => {
            format!("Adding {} canceled. Nothing was saved.", session.target)
        }
        SessionKind::AwaitReplacementList => "Update canceled.".to_string(),
        SessionKind::AwaitConfirmation => "Deletion canceled.".to_string(),
        SessionKind::AwaitNewPrice { .. } => {
            format!("Price edit for {} canceled.", session.target)
        }
    };
    Panel::info("Canceled").with_description(message)
}

pub fn expired_notice(session: &Session, timeout_minutes: u32) -> Panel {
    Panel::info("Timed Out").with_description(format!(
        "Your {} dialog for {} was canceled after {} minute(s) without a reply. Nothing was saved.",
        session.kind.label(),
        session.target,
        timeout_minutes
    ))
}

/// One page of the price editor: an edit control per entry plus navigation.
pub fn price_panel(state: &PaginationState) -> Panel {
    let panel = Panel::info("Ingredient Prices");
    if state.is_empty() {
        return panel.with_description("No ingredients found.");
    }
    let page = state.page();
    let mut panel = if page.entries.is_empty() {
        panel.with_description("No entries on this page.")
    } else {
        panel.with_description(format!(
            "Click an ingredient to edit its price. Showing {}-{} of {}.",
            page.start + 1,
            page.start + page.entries.len(),
            state.len()
        ))
    };
    for entry in page.entries {
        panel = panel.with_control(
            ControlAction::EditPrice {
                start: page.start,
                ingredient: entry.ingredient.clone(),
            },
            format!("{}: {}", entry.ingredient, money(entry.cost_per_unit)),
        );
    }
    if page.has_previous {
        panel = panel.with_control(
            ControlAction::PricePage {
                direction: Direction::Previous,
                start: page.start,
            },
            "Previous",
        );
    }
    if page.has_next {
        panel = panel.with_control(
            ControlAction::PricePage {
                direction: Direction::Next,
                start: page.start,
            },
            "Next",
        );
    }
    panel
}

/// Dispatches parsed commands, control selections and dialog replies.
pub struct CommandProcessor;

impl CommandProcessor {
    pub fn new() -> Self {
        CommandProcessor
    }

    pub fn process(
        &self,
        ctx: &mut CommandContext<'_>,
        command: CommandName,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        debug!(
            "{}@{} ran {} '{}'",
            escape_log(ctx.author),
            escape_log(ctx.channel),
            command.as_str(),
            escape_log(args)
        );
        match command {
            CommandName::AddItem => self.add_item(ctx, args),
            CommandName::ListItems => self.list_items(ctx),
            CommandName::ListIngredients => self.list_ingredients(ctx, args),
            CommandName::CalculateIngredients => self.calculate_ingredients(ctx, args),
            CommandName::CalculateCost => self.calculate_cost(ctx, args),
            CommandName::UpdateItem => self.update_item(ctx, args),
            CommandName::DeleteItem => self.delete_item(ctx, args),
            CommandName::AddIngredient => self.add_ingredient(ctx, args),
            CommandName::SetIngredientQuantity => self.set_ingredient_quantity(ctx, args),
            CommandName::CheckIngredientQuantity => self.check_ingredient_quantity(ctx, args),
            CommandName::ListMyIngredients => self.list_my_ingredients(ctx),
            CommandName::ListIngredientsPrices => self.list_ingredient_prices(ctx),
            CommandName::Help => Ok(vec![help_panel(&ctx.bot.name, &ctx.bot.command_prefix)]),
        }
    }

    /// Feed free text to the author's dialog in this channel, if any.
    pub fn reply(&self, ctx: &mut CommandContext<'_>, text: &str) -> Result<Vec<Panel>, CraftError> {
        let routed = ctx.sessions.feed_at(
            ctx.author,
            ctx.channel,
            &Input::Text(text.to_string()),
            ctx.now,
        );
        self.resolve(ctx, routed)
    }

    /// Act on a selected control.
    pub fn select(
        &self,
        ctx: &mut CommandContext<'_>,
        action: ControlAction,
    ) -> Result<Vec<Panel>, CraftError> {
        match action {
            ControlAction::ShowItem(name) => self.show_item(ctx, &name),
            ControlAction::PricePage { direction, start } => {
                let state = self.price_state(ctx, start)?;
                Ok(vec![price_panel(&state.advance(direction))])
            }
            ControlAction::EditPrice { start, ingredient } => {
                self.edit_price(ctx, start, &ingredient)
            }
            ControlAction::Confirm(choice) => {
                let routed =
                    ctx.sessions
                        .feed_at(ctx.author, ctx.channel, &Input::Choice(choice), ctx.now);
                if matches!(routed, Routed::NoSession) {
                    return Ok(vec![Panel::info("Confirmation")
                        .with_description("There is nothing waiting for your confirmation.")]);
                }
                self.resolve(ctx, routed)
            }
        }
    }

    /// Turn a routed dialog input into panels, committing on a terminal `Commit`.
    pub fn resolve(
        &self,
        ctx: &mut CommandContext<'_>,
        routed: Routed,
    ) -> Result<Vec<Panel>, CraftError> {
        match routed {
            Routed::NoSession => Ok(Vec::new()),
            Routed::Expired(session) => Ok(vec![expired_notice(&session, ctx.bot.session_timeout)]),
            Routed::Fed { session, outcome } => match outcome {
                Outcome::Continue => Ok(vec![collection_progress(&session)]),
                Outcome::Invalid(message) => Ok(vec![Panel::error(message)]),
                Outcome::Cancel => Ok(vec![cancel_notice(&session)]),
                Outcome::Commit(payload) => self.commit(ctx, &session, payload),
            },
        }
    }

    fn commit(
        &self,
        ctx: &mut CommandContext<'_>,
        session: &Session,
        payload: Payload,
    ) -> Result<Vec<Panel>, CraftError> {
        let target = &session.target;
        match payload {
            Payload::Ingredients(lines) => {
                let description = match &session.kind {
                    SessionKind::CollectIngredients { description } => description.clone(),
                    _ => String::new(),
                };
                let item = Item::new(target.as_str(), &lines, description.as_str(), ctx.author);
                let ingredients = item.ingredients.clone();
                match ctx.store.insert_item(item) {
                    Ok(()) => {}
                    // Someone else took the name while the dialog was open
                    Err(err @ CraftError::DuplicateKey(_)) => {
                        warn!(
                            "{} lost add-item race for {}",
                            escape_log(ctx.author),
                            escape_log(target)
                        );
                        return Ok(vec![Panel::error(err.to_string())
                            .with_field("Collected ingredients", ingredients)]);
                    }
                    Err(err) => return Err(err),
                }
                info!("{} added item {}", escape_log(ctx.author), escape_log(target));
                Ok(vec![Panel::success("Item Added").with_description(format!(
                    "{} added with ingredients: {}\nDescription: {}",
                    title_case(target),
                    ingredients,
                    description
                ))])
            }
            Payload::Replacement(text) => {
                ctx.store.update_item_ingredients(target, &text)?;
                info!("{} updated item {}", escape_log(ctx.author), escape_log(target));
                Ok(vec![Panel::success("Item Updated")
                    .with_description(format!("Ingredients updated for {}.", target))])
            }
            Payload::Confirmed => {
                ctx.store.delete_item(target)?;
                info!("{} deleted item {}", escape_log(ctx.author), escape_log(target));
                Ok(vec![Panel::success("Item Deleted")
                    .with_description(format!("{} has been deleted.", target))])
            }
            Payload::Price(price) => {
                let page_start = match session.kind {
                    SessionKind::AwaitNewPrice { page_start } => page_start,
                    _ => 0,
                };
                ctx.store.set_ingredient_cost(target, price)?;
                info!(
                    "{} set price of {} to {}",
                    escape_log(ctx.author),
                    escape_log(target),
                    money(price)
                );
                let state = self.price_state(ctx, page_start)?;
                Ok(vec![
                    Panel::success("Price Updated").with_description(format!(
                        "Updated the price of {} to {}",
                        target,
                        money(price)
                    )),
                    price_panel(&state),
                ])
            }
        }
    }

    fn price_state(
        &self,
        ctx: &CommandContext<'_>,
        start: usize,
    ) -> Result<PaginationState, CraftError> {
        let entries: Vec<PriceEntry> = ctx
            .store
            .list_ingredient_costs()?
            .into_iter()
            .map(PriceEntry::from)
            .collect();
        Ok(PaginationState::new(entries, start, ctx.bot.page_size))
    }

    fn add_item(&self, ctx: &mut CommandContext<'_>, args: &str) -> Result<Vec<Panel>, CraftError> {
        let usage = ctx.usage(CommandName::AddItem);
        let (name, description) = validation::split_name_description(args, &usage)?;
        let name = validation::normalize_name(name)?;
        match ctx.store.get_item(&name) {
            Ok(existing) => return Err(CraftError::DuplicateKey(existing.name)),
            Err(CraftError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        ctx.start(
            SessionKind::CollectIngredients {
                description: description.to_string(),
            },
            &name,
        )?;
        Ok(vec![Panel::info(format!("Adding Ingredients for {}", title_case(&name)))
            .with_description(format!(
                "Please type the ingredients (e.g., '5 sugar'), one per message, followed by '{}' when finished or '{}' to stop.",
                DONE_TOKEN, CANCEL_TOKEN
            ))])
    }

    fn list_items(&self, ctx: &mut CommandContext<'_>) -> Result<Vec<Panel>, CraftError> {
        let items = ctx.store.list_items()?;
        let mut panel = Panel::info("Items List");
        if items.is_empty() {
            return Ok(vec![panel.with_description("No items found in the database.")]);
        }
        for item in items {
            panel = panel
                .with_field(title_case(&item.name), item.description.clone())
                .with_control(ControlAction::ShowItem(item.name.clone()), title_case(&item.name));
        }
        Ok(vec![panel])
    }

    fn show_item(&self, ctx: &mut CommandContext<'_>, name: &str) -> Result<Vec<Panel>, CraftError> {
        let item = ctx.store.get_item(name)?;
        Ok(vec![Panel::success(title_case(&item.name))
            .with_description(item.description.clone())
            .with_field("Ingredients", item.ingredients)])
    }

    fn list_ingredients(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let name = require_args(args, ctx.usage(CommandName::ListIngredients))?;
        let name = validation::normalize_name(name)?;
        let item = ctx.store.get_item(&name)?;
        Ok(vec![Panel::info(format!("Ingredients for {}", item.name))
            .with_description(item.ingredients)])
    }

    /// Shared front half of both calculate commands.
    fn cost_report(
        &self,
        ctx: &CommandContext<'_>,
        command: CommandName,
        args: &str,
    ) -> Result<CostReport, CraftError> {
        let usage = ctx.usage(command);
        let (name, quantity) = validation::split_trailing_value(args, &usage)?;
        let quantity = validation::parse_quantity(quantity)?;
        if quantity <= 0 {
            return Err(ValidationError::InvalidQuantity {
                value: quantity.to_string(),
            }
            .into());
        }
        let name = validation::normalize_name(name)?;
        let item = ctx.store.get_item(&name)?;
        let prices = ctx.store.price_table()?;
        compute_cost(&item, quantity, |ingredient| prices.get(ingredient).copied())
    }

    fn calculate_ingredients(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let report = self.cost_report(ctx, CommandName::CalculateIngredients, args)?;
        let lines = report
            .lines
            .iter()
            .map(|line| match line.cost {
                LineCost::Priced { total, .. } => {
                    format!("{}x {} at {}", line.needed, line.ingredient, money(total))
                }
                LineCost::Unset => format!("{}x {} (cost not set)", line.needed, line.ingredient),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![Panel::success(format!(
            "Ingredients to craft {} of {}",
            report.requested, report.item
        ))
        .with_description(lines)
        .with_field("Total Cost", money(report.total_cost))])
    }

    fn calculate_cost(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let report = self.cost_report(ctx, CommandName::CalculateCost, args)?;
        let lines = report
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let mut panel = Panel::success(format!(
            "Total cost to craft {} of {}",
            report.requested, report.item
        ))
        .with_description(lines)
        .with_field("Total Cost", money(report.total_cost));
        if !report.has_any_price() {
            panel = panel.with_field("Note", "No cost data available for ingredients.");
        } else {
            let unpriced: Vec<&str> = report.unpriced().map(|l| l.ingredient.as_str()).collect();
            if !unpriced.is_empty() {
                panel = panel.with_field("Cost not set", unpriced.join(", "));
            }
        }
        Ok(vec![panel])
    }

    fn update_item(&self, ctx: &mut CommandContext<'_>, args: &str) -> Result<Vec<Panel>, CraftError> {
        let name = require_args(args, ctx.usage(CommandName::UpdateItem))?;
        let name = validation::normalize_name(name)?;
        let item = ctx.store.get_item(&name)?;
        ctx.start(SessionKind::AwaitReplacementList, &item.name)?;
        Ok(vec![Panel::info(format!("Update {}", title_case(&item.name)))
            .with_description(format!(
                "Please enter the new ingredients list for this item, or type '{}' to stop.",
                CANCEL_TOKEN
            ))
            .with_field("Current ingredients", item.ingredients)])
    }

    fn delete_item(&self, ctx: &mut CommandContext<'_>, args: &str) -> Result<Vec<Panel>, CraftError> {
        let name = require_args(args, ctx.usage(CommandName::DeleteItem))?;
        let name = validation::normalize_name(name)?;
        let item = ctx.store.get_item(&name)?;
        ctx.start(SessionKind::AwaitConfirmation, &item.name)?;
        Ok(vec![Panel::info("Confirm Deletion")
            .with_description(format!("Are you sure you want to delete {}?", item.name))
            .with_control(ControlAction::Confirm(Choice::Affirm), "Confirm")
            .with_control(ControlAction::Confirm(Choice::Decline), "Cancel")])
    }

    fn add_ingredient(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let usage = ctx.usage(CommandName::AddIngredient);
        let (name, cost) = validation::split_trailing_value(args, &usage)?;
        let name = validation::normalize_name(name)?;
        let cost = validation::parse_amount(cost)?;
        let message = match ctx.store.set_ingredient_cost(&name, cost)? {
            Upsert::Updated => {
                format!("Updated the cost of {} to {} per unit.", name, money(cost))
            }
            Upsert::Inserted => format!("Added {} with a cost of {} per unit.", name, money(cost)),
        };
        Ok(vec![Panel::success("Ingredient Cost").with_description(message)])
    }

    fn set_ingredient_quantity(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let usage = ctx.usage(CommandName::SetIngredientQuantity);
        let (name, quantity) = validation::split_trailing_value(args, &usage)?;
        let name = validation::normalize_name(name)?;
        let quantity = validation::parse_amount(quantity)?;
        ctx.store.set_user_quantity(ctx.author, &name, quantity)?;
        Ok(vec![Panel::success("Inventory Updated")
            .with_description(format!("Set {} of {} for {}.", quantity, name, ctx.author))])
    }

    fn check_ingredient_quantity(
        &self,
        ctx: &mut CommandContext<'_>,
        args: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let name = require_args(args, ctx.usage(CommandName::CheckIngredientQuantity))?;
        let name = validation::normalize_name(name)?;
        let message = match ctx.store.get_user_quantity(ctx.author, &name)? {
            Some(entry) => format!("You have {} of {}.", entry.quantity, name),
            None => format!("You do not have any {} recorded.", name),
        };
        Ok(vec![Panel::info("Inventory").with_description(message)])
    }

    fn list_my_ingredients(&self, ctx: &mut CommandContext<'_>) -> Result<Vec<Panel>, CraftError> {
        let entries = ctx.store.list_user_inventory(ctx.author)?;
        let mut panel = Panel::info("Your Ingredients");
        if entries.is_empty() {
            return Ok(vec![panel.with_description("You don't have any ingredients recorded.")]);
        }
        for entry in entries {
            panel = panel.with_field(entry.ingredient, entry.quantity.to_string());
        }
        Ok(vec![panel])
    }

    fn list_ingredient_prices(&self, ctx: &mut CommandContext<'_>) -> Result<Vec<Panel>, CraftError> {
        let state = self.price_state(ctx, 0)?;
        Ok(vec![price_panel(&state)])
    }

    fn edit_price(
        &self,
        ctx: &mut CommandContext<'_>,
        start: usize,
        ingredient: &str,
    ) -> Result<Vec<Panel>, CraftError> {
        let Some(cost) = ctx.store.find_ingredient_cost(ingredient)? else {
            return Err(CraftError::NotFound(format!("Ingredient '{}'", ingredient)));
        };
        ctx.start(SessionKind::AwaitNewPrice { page_start: start }, &cost.ingredient)?;
        Ok(vec![Panel::info("Edit Price")
            .with_description(format!(
                "Enter the new price for {} (currently {}), or type '{}' to stop.",
                cost.ingredient,
                money(cost.cost_per_unit),
                CANCEL_TOKEN
            ))])
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_headings() {
        assert_eq!(title_case("healing potion"), "Healing Potion");
        assert_eq!(title_case("x"), "X");
    }

    #[test]
    fn price_panel_offers_navigation_only_when_useful() {
        let entries: Vec<PriceEntry> = (0..7)
            .map(|i| PriceEntry {
                ingredient: format!("ing{}", i),
                cost_per_unit: 1.5,
            })
            .collect();
        let first = price_panel(&PaginationState::new(entries.clone(), 0, 5));
        let labels: Vec<&str> = first.controls.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], "ing0: $1.50");
        assert_eq!(labels[5], "Next");

        let second = price_panel(&PaginationState::new(entries, 5, 5));
        let labels: Vec<&str> = second.controls.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["ing5: $1.50", "ing6: $1.50", "Previous"]);
        assert_eq!(second.controls[0].id, "price:5:ing5");
    }

    #[test]
    fn empty_price_list() {
        let panel = price_panel(&PaginationState::new(Vec::new(), 0, 5));
        assert_eq!(panel.description, "No ingredients found.");
        assert!(panel.controls.is_empty());
    }
}
