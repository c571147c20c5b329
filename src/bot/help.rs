//! Static help listing.
use crate::bot::panel::Panel;
use crate::bot::parser::CommandName;
use crate::crafting::session::{CANCEL_TOKEN, DONE_TOKEN};

pub fn help_panel(bot_name: &str, prefix: &str) -> Panel {
    let mut panel = Panel::success("Help").with_description(format!(
        "{} - list of available commands. Names also work with underscores (e.g. {}add_item).",
        bot_name, prefix
    ));
    for command in CommandName::ALL {
        panel = panel.with_field(command.usage(prefix), command.summary());
    }
    panel.with_field(
        "Dialogs",
        format!(
            "While adding an item, send one '<quantity> <ingredient>' per message and '{}' to save. '{}' stops any typed dialog.",
            DONE_TOKEN, CANCEL_TOKEN
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_listed_with_prefix() {
        let panel = help_panel("Recipe Ranger", "$");
        assert_eq!(panel.fields.len(), CommandName::ALL.len() + 1);
        assert!(panel
            .fields
            .iter()
            .any(|f| f.name == "$calculate-cost <item_name> <quantity>"));
        assert!(panel.description.starts_with("Recipe Ranger"));
    }
}
