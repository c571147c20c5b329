//! Boundary validation for catalog input.
//!
//! Everything a user types passes through here before it reaches the store:
//! names are trimmed, whitespace-collapsed and lower-cased so every later
//! lookup can compare keys byte-for-byte; recipe lines, amounts and
//! quantities are parsed into typed values or rejected with a
//! [`ValidationError`] that is safe to show back to the user.

use crate::crafting::types::RecipeLine;

/// Validation errors with user-facing messages
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing arguments. Usage: `{usage}`")]
    MissingArguments { usage: String },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Incorrect format '{line}'. Please enter the ingredient in the format 'quantity ingredient_name'. Example: '5 sugar'")]
    InvalidRecipeLine { line: String },

    #[error("Invalid amount '{value}'. Please provide a non-negative numeric value.")]
    InvalidAmount { value: String },

    #[error("Invalid quantity '{value}'. Quantity must be a positive whole number.")]
    InvalidQuantity { value: String },
}

/// Separator between recipe lines in stored ingredient text.
pub const RECIPE_SEPARATOR: &str = ", ";

/// Trim, collapse internal whitespace and lower-case a record name.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let bad: Vec<String> = collapsed
        .chars()
        .filter(|c| c.is_control())
        .map(|c| format!("\\u{{{:04x}}}", c as u32))
        .collect();
    if !bad.is_empty() {
        return Err(ValidationError::InvalidCharacters { chars: bad.join(", ") });
    }
    Ok(collapsed.to_lowercase())
}

/// Parse one `<positive integer> <ingredient name>` line.
///
/// The first whitespace-delimited token is the quantity; the remaining tokens,
/// re-joined with single spaces, form the ingredient name.
pub fn parse_recipe_line(line: &str) -> Result<RecipeLine, ValidationError> {
    let invalid = || ValidationError::InvalidRecipeLine {
        line: line.trim().to_string(),
    };
    let mut tokens = line.split_whitespace();
    let qty_token = tokens.next().ok_or_else(invalid)?;
    if !qty_token.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let quantity: u32 = qty_token.parse().map_err(|_| invalid())?;
    if quantity == 0 {
        return Err(invalid());
    }
    let rest = tokens.collect::<Vec<_>>().join(" ");
    if rest.is_empty() || rest.contains(',') {
        return Err(invalid());
    }
    let ingredient = normalize_name(&rest).map_err(|_| invalid())?;
    Ok(RecipeLine::new(quantity, ingredient))
}

/// Parse stored ingredient text (`"5 sugar, 2 flour"`) into ordered recipe lines.
pub fn parse_recipe_text(text: &str) -> Result<Vec<RecipeLine>, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::InvalidRecipeLine {
            line: String::new(),
        });
    }
    text.split(',').map(parse_recipe_line).collect()
}

/// Render recipe lines back into canonical stored text.
pub fn format_recipe(lines: &[RecipeLine]) -> String {
    lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(RECIPE_SEPARATOR)
}

/// Parse a cost or inventory amount: finite and non-negative. Zero is accepted.
pub fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidAmount {
        value: trimmed.to_string(),
    };
    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    // Normalise -0.0 so it never renders as "-0.00"
    Ok(if value == 0.0 { 0.0 } else { value })
}

/// Parse a requested crafting quantity. Sign is checked by the cost engine.
pub fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidQuantity {
            value: trimmed.to_string(),
        })
}

/// Split `<name with spaces> <value>` at the last whitespace run.
pub fn split_trailing_value<'a>(
    args: &'a str,
    usage: &str,
) -> Result<(&'a str, &'a str), ValidationError> {
    let missing = || ValidationError::MissingArguments {
        usage: usage.to_string(),
    };
    let trimmed = args.trim();
    let (name, value) = trimmed.rsplit_once(char::is_whitespace).ok_or_else(missing)?;
    let name = name.trim_end();
    if name.is_empty() || value.is_empty() {
        return Err(missing());
    }
    Ok((name, value))
}

/// Split `<name> | <description>`; both halves are required.
pub fn split_name_description<'a>(
    args: &'a str,
    usage: &str,
) -> Result<(&'a str, &'a str), ValidationError> {
    let missing = || ValidationError::MissingArguments {
        usage: usage.to_string(),
    };
    let (name, description) = args.split_once('|').ok_or_else(missing)?;
    let (name, description) = (name.trim(), description.trim());
    if name.is_empty() || description.is_empty() {
        return Err(missing());
    }
    Ok((name, description))
}
