//! Command front-end: recognise `<prefix><name> [args]` and map the name to a
//! [`CommandName`]. Names match case-insensitively and accept either `-` or
//! `_` as the word separator (`!add-item`, `!add_item`, `!ADD_ITEM`).
//! Arguments are returned untouched; each handler validates its own.
use log::trace;

use crate::logutil::escape_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    AddItem,
    ListItems,
    ListIngredients,
    CalculateIngredients,
    CalculateCost,
    UpdateItem,
    DeleteItem,
    AddIngredient,
    SetIngredientQuantity,
    CheckIngredientQuantity,
    ListMyIngredients,
    ListIngredientsPrices,
    Help,
}

impl CommandName {
    pub const ALL: [CommandName; 13] = [
        CommandName::AddItem,
        CommandName::ListItems,
        CommandName::ListIngredients,
        CommandName::CalculateIngredients,
        CommandName::CalculateCost,
        CommandName::UpdateItem,
        CommandName::DeleteItem,
        CommandName::AddIngredient,
        CommandName::SetIngredientQuantity,
        CommandName::CheckIngredientQuantity,
        CommandName::ListMyIngredients,
        CommandName::ListIngredientsPrices,
        CommandName::Help,
    ];

    /// Canonical hyphenated name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::AddItem => "add-item",
            CommandName::ListItems => "list-items",
            CommandName::ListIngredients => "list-ingredients",
            CommandName::CalculateIngredients => "calculate-ingredients",
            CommandName::CalculateCost => "calculate-cost",
            CommandName::UpdateItem => "update-item",
            CommandName::DeleteItem => "delete-item",
            CommandName::AddIngredient => "add-ingredient",
            CommandName::SetIngredientQuantity => "set-ingredient-quantity",
            CommandName::CheckIngredientQuantity => "check-ingredient-quantity",
            CommandName::ListMyIngredients => "list-my-ingredients",
            CommandName::ListIngredientsPrices => "list-ingredients-prices",
            CommandName::Help => "help",
        }
    }

    /// Argument form shown in usage messages and help.
    pub fn args(&self) -> &'static str {
        match self {
            CommandName::AddItem => "<item_name> | <description>",
            CommandName::ListIngredients
            | CommandName::UpdateItem
            | CommandName::DeleteItem => "<item_name>",
            CommandName::CalculateIngredients | CommandName::CalculateCost => {
                "<item_name> <quantity>"
            }
            CommandName::AddIngredient => "<ingredient_name> <cost>",
            CommandName::SetIngredientQuantity => "<ingredient_name> <quantity>",
            CommandName::CheckIngredientQuantity => "<ingredient_name>",
            CommandName::ListItems
            | CommandName::ListMyIngredients
            | CommandName::ListIngredientsPrices
            | CommandName::Help => "",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            CommandName::AddItem => "Add a new item and its ingredients.",
            CommandName::ListItems => "List all items in the catalog.",
            CommandName::ListIngredients => "List the ingredients of a specific item.",
            CommandName::CalculateIngredients => {
                "Calculate the required ingredients for a given quantity."
            }
            CommandName::CalculateCost => "Calculate the total cost to craft an item.",
            CommandName::UpdateItem => "Replace the ingredients of an item.",
            CommandName::DeleteItem => "Delete an item from the catalog.",
            CommandName::AddIngredient => "Add an ingredient or update its cost per unit.",
            CommandName::SetIngredientQuantity => {
                "Set or update the quantity of an ingredient you have."
            }
            CommandName::CheckIngredientQuantity => {
                "Check how much of a specific ingredient you have."
            }
            CommandName::ListMyIngredients => "List all ingredients you currently have.",
            CommandName::ListIngredientsPrices => "Browse and edit ingredient prices.",
            CommandName::Help => "Show this list.",
        }
    }

    /// `add-item <item_name> | <description>` style usage line for a prefix.
    pub fn usage(&self, prefix: &str) -> String {
        let args = self.args();
        if args.is_empty() {
            format!("{}{}", prefix, self.as_str())
        } else {
            format!("{}{} {}", prefix, self.as_str(), args)
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let canonical = name.trim().to_ascii_lowercase().replace('_', "-");
        CommandName::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == canonical)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Text without the command prefix.
    NotACommand,
    /// Prefixed text naming no known command.
    Unknown(String),
    Command { name: CommandName, args: String },
}

/// Minimal prefix-based command parser
pub struct CommandParser {
    prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, raw: &str) -> ParsedCommand {
        let trimmed = raw.trim();
        let Some(body) = trimmed.strip_prefix(self.prefix.as_str()) else {
            return ParsedCommand::NotACommand;
        };
        let (name, args) = match body.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (body, ""),
        };
        if name.is_empty() {
            return ParsedCommand::NotACommand;
        }
        match CommandName::from_name(name) {
            Some(command) => {
                trace!("Parsed {} from '{}'", command.as_str(), escape_log(raw));
                ParsedCommand::Command {
                    name: command,
                    args: args.to_string(),
                }
            }
            None => ParsedCommand::Unknown(name.to_string()),
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("!")
    }
}
