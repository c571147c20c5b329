//! Presentation contract between the bot and whatever draws its replies.
//!
//! A [`Panel`] is a titled block of text with optional named fields and a
//! few selectable [`Control`]s. Each control carries an id that the front-end
//! sends back verbatim when the user selects it; [`ControlAction`] is the
//! codec for those ids. [`Panel::render_text`] is the plain-text rendering
//! used by the console front-end and by tests.

use std::fmt;
use std::str::FromStr;

use crate::crafting::session::Choice;
use crate::crafting::Direction;

/// Accent for a panel, mirroring info / success / error colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
    pub controls: Vec<Control>,
    pub tone: Tone,
}

impl Panel {
    fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            fields: Vec::new(),
            controls: Vec::new(),
            tone,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(title, Tone::Info)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title, Tone::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", Tone::Error).with_description(message)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_control(mut self, action: ControlAction, label: impl Into<String>) -> Self {
        self.controls.push(Control {
            id: action.to_string(),
            label: label.into(),
        });
        self
    }

    /// Plain-text rendering: header, description, fields, then one line per control.
    pub fn render_text(&self) -> String {
        let marker = match self.tone {
            Tone::Info => "==",
            Tone::Success => "++",
            Tone::Error => "!!",
        };
        let mut out = format!("{} {} {}\n", marker, self.title, marker);
        if !self.description.is_empty() {
            out.push_str(&self.description);
            out.push('\n');
        }
        for field in &self.fields {
            out.push_str(&format!("{}: {}\n", field.name, field.value));
        }
        for control in &self.controls {
            out.push_str(&format!("[{}] (@{})\n", control.label, control.id));
        }
        out
    }
}

/// What selecting a control asks the bot to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// Show one item's details (list-items buttons).
    ShowItem(String),
    /// Move the price list one page from `start`.
    PricePage { direction: Direction, start: usize },
    /// Edit an ingredient's price from the page starting at `start`.
    EditPrice { start: usize, ingredient: String },
    /// Answer a confirmation prompt.
    Confirm(Choice),
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::ShowItem(name) => write!(f, "item:{}", name),
            ControlAction::PricePage { direction, start } => {
                let dir = match direction {
                    Direction::Previous => "prev",
                    Direction::Next => "next",
                };
                write!(f, "prices:{}:{}", dir, start)
            }
            ControlAction::EditPrice { start, ingredient } => {
                write!(f, "price:{}:{}", start, ingredient)
            }
            ControlAction::Confirm(Choice::Affirm) => f.write_str("confirm:yes"),
            ControlAction::Confirm(Choice::Decline) => f.write_str("confirm:no"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control '{0}'")]
pub struct UnknownControl(pub String);

impl FromStr for ControlAction {
    type Err = UnknownControl;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownControl(id.to_string());
        let (kind, rest) = id.trim().split_once(':').ok_or_else(unknown)?;
        match kind {
            "item" if !rest.is_empty() => Ok(ControlAction::ShowItem(rest.to_string())),
            "prices" => {
                let (dir, start) = rest.split_once(':').ok_or_else(unknown)?;
                let direction = match dir {
                    "prev" => Direction::Previous,
                    "next" => Direction::Next,
                    _ => return Err(unknown()),
                };
                let start = start.parse().map_err(|_| unknown())?;
                Ok(ControlAction::PricePage { direction, start })
            }
            "price" => {
                let (start, ingredient) = rest.split_once(':').ok_or_else(unknown)?;
                let start = start.parse().map_err(|_| unknown())?;
                if ingredient.is_empty() {
                    return Err(unknown());
                }
                Ok(ControlAction::EditPrice {
                    start,
                    ingredient: ingredient.to_string(),
                })
            }
            "confirm" => match rest {
                "yes" => Ok(ControlAction::Confirm(Choice::Affirm)),
                // Any other answer to a confirmation prompt declines it.
                _ => Ok(ControlAction::Confirm(Choice::Decline)),
            },
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ids_parse_back() {
        let actions = [
            ControlAction::ShowItem("healing potion".to_string()),
            ControlAction::PricePage {
                direction: Direction::Next,
                start: 5,
            },
            ControlAction::EditPrice {
                start: 10,
                ingredient: "dragon: scale".to_string(),
            },
            ControlAction::Confirm(Choice::Affirm),
            ControlAction::Confirm(Choice::Decline),
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<ControlAction>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_controls_rejected() {
        assert!("".parse::<ControlAction>().is_err());
        assert!("item:".parse::<ControlAction>().is_err());
        assert!("prices:sideways:0".parse::<ControlAction>().is_err());
        assert!("price:x:herb".parse::<ControlAction>().is_err());
        assert_eq!(
            "confirm:maybe".parse::<ControlAction>().unwrap(),
            ControlAction::Confirm(Choice::Decline)
        );
    }

    #[test]
    fn render_lists_fields_and_controls() {
        let panel = Panel::info("Items List")
            .with_field("cake", "a cake")
            .with_control(ControlAction::ShowItem("cake".to_string()), "cake");
        assert_eq!(
            panel.render_text(),
            "== Items List ==\ncake: a cake\n[cake] (@item:cake)\n"
        );
    }
}
