//! Dialog behaviour through the bot: isolation, conflicts and idle timeouts.

use chrono::{Duration, Utc};
use reciperanger::bot::{InboundEvent, Tone};
use reciperanger::crafting::{RecipeLine, SessionKind};

mod common;
use common::{only, say, select};

#[test]
fn two_owners_collect_independently() {
    let (_dir, mut bot) = common::test_bot();
    say(&mut bot, "alice", "kitchen", "!add-item cake | sweet");
    say(&mut bot, "bob", "kitchen", "!add-item bread | plain");

    say(&mut bot, "alice", "kitchen", "5 sugar");
    say(&mut bot, "bob", "kitchen", "3 flour");
    say(&mut bot, "alice", "kitchen", "2 flour");

    let alice = bot.sessions().get("alice", "kitchen").expect("alice session");
    assert_eq!(
        alice.collected,
        vec![RecipeLine::new(5, "sugar"), RecipeLine::new(2, "flour")]
    );
    let bob = bot.sessions().get("bob", "kitchen").expect("bob session");
    assert_eq!(bob.collected, vec![RecipeLine::new(3, "flour")]);

    only(say(&mut bot, "bob", "kitchen", "done"));
    assert!(bot.sessions().get("alice", "kitchen").is_some());
    assert_eq!(bot.store().get_item("bread").unwrap().ingredients, "3 flour");
    assert!(bot.store().get_item("cake").is_err());
}

#[test]
fn same_owner_in_another_channel_is_a_separate_slot() {
    let (_dir, mut bot) = common::test_bot();
    say(&mut bot, "alice", "kitchen", "!add-item cake | sweet");
    // Text in another channel is not routed to the kitchen dialog
    assert!(say(&mut bot, "alice", "hall", "5 sugar").is_empty());
    assert!(bot.sessions().get("alice", "kitchen").unwrap().collected.is_empty());

    let panel = only(say(&mut bot, "alice", "hall", "!add-item pie | tart"));
    assert_eq!(panel.tone, Tone::Info);
    assert_eq!(bot.sessions().len(), 2);
}

#[test]
fn second_dialog_is_rejected_and_first_survives() {
    let (_dir, mut bot) = common::test_bot();
    common::add_item(&mut bot, "alice", "cake", "sweet", &["1 egg"]);

    say(&mut bot, "alice", "kitchen", "!add-item pie | tart");
    say(&mut bot, "alice", "kitchen", "4 apple");
    let panel = only(say(&mut bot, "alice", "kitchen", "!delete-item cake"));
    assert_eq!(panel.tone, Tone::Error);
    assert!(panel.description.contains("pending add-item dialog"));

    let session = bot.sessions().get("alice", "kitchen").unwrap();
    assert!(matches!(session.kind, SessionKind::CollectIngredients { .. }));
    assert_eq!(session.collected.len(), 1);
    assert!(bot.store().get_item("cake").is_ok());
}

#[test]
fn bad_lines_do_not_end_the_dialog() {
    let (_dir, mut bot) = common::test_bot();
    say(&mut bot, "alice", "kitchen", "!add-item cake | sweet");
    let panel = only(say(&mut bot, "alice", "kitchen", "a pinch of salt"));
    assert_eq!(panel.tone, Tone::Error);
    assert!(panel.description.contains("Incorrect format"));

    let panel = only(say(&mut bot, "alice", "kitchen", "done"));
    assert_eq!(panel.tone, Tone::Error);
    assert!(bot.sessions().get("alice", "kitchen").is_some());

    let panel = only(say(&mut bot, "alice", "kitchen", "2 eggs"));
    assert!(panel.description.contains("2 eggs"));
    assert_eq!(only(say(&mut bot, "alice", "kitchen", "done")).title, "Item Added");
}

#[test]
fn cancel_discards_collected_lines() {
    let (_dir, mut bot) = common::test_bot();
    say(&mut bot, "alice", "kitchen", "!add-item cake | sweet");
    say(&mut bot, "alice", "kitchen", "2 eggs");
    let panel = only(say(&mut bot, "alice", "kitchen", "cancel"));
    assert_eq!(panel.title, "Canceled");
    assert!(bot.sessions().is_empty());
    assert!(bot.store().get_item("cake").is_err());
}

#[test]
fn idle_dialog_times_out_and_frees_the_slot() {
    let (_dir, mut bot) = common::test_bot_with(|c| c.bot.session_timeout = 2);
    let t0 = Utc::now();
    bot.handle_event_at(&InboundEvent::text("alice", "kitchen", "!add-item cake | sweet"), t0);
    bot.handle_event_at(
        &InboundEvent::text("alice", "kitchen", "1 egg"),
        t0 + Duration::minutes(1),
    );

    // A late line expires the dialog instead of extending it
    let late = bot.handle_event_at(
        &InboundEvent::text("alice", "kitchen", "2 milk"),
        t0 + Duration::minutes(4),
    );
    let panel = only(late);
    assert_eq!(panel.title, "Timed Out");
    assert!(panel.description.contains("add-item"));
    assert!(bot.sessions().is_empty());
    assert!(bot.store().get_item("cake").is_err());

    let restart = only(bot.handle_event_at(
        &InboundEvent::text("alice", "kitchen", "!add-item cake | sweet"),
        t0 + Duration::minutes(4),
    ));
    assert_eq!(restart.tone, Tone::Info);
}

#[test]
fn sweep_notifies_owners_of_expired_dialogs() {
    let (_dir, mut bot) = common::test_bot_with(|c| c.bot.session_timeout = 5);
    let t0 = Utc::now();
    bot.handle_event_at(&InboundEvent::text("alice", "kitchen", "!add-item cake | x"), t0);
    bot.handle_event_at(
        &InboundEvent::text("bob", "hall", "!add-item pie | y"),
        t0 + Duration::minutes(3),
    );

    let notices = bot.sweep_idle_at(t0 + Duration::minutes(6));
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key.owner, "alice");
    assert_eq!(notices[0].key.channel, "kitchen");
    assert_eq!(notices[0].panel.title, "Timed Out");
    assert!(bot.sessions().get("bob", "hall").is_some());
}

#[test]
fn confirmation_belongs_to_its_owner() {
    let (_dir, mut bot) = common::test_bot();
    common::add_item(&mut bot, "alice", "cake", "sweet", &["1 egg"]);
    say(&mut bot, "alice", "kitchen", "!delete-item cake");

    let panel = only(select(&mut bot, "bob", "kitchen", "confirm:yes"));
    assert!(panel.description.contains("nothing waiting"));
    assert!(bot.store().get_item("cake").is_ok());

    let panel = only(select(&mut bot, "alice", "kitchen", "confirm:yes"));
    assert_eq!(panel.title, "Item Deleted");
    assert!(bot.store().get_item("cake").is_err());
}

#[test]
fn name_taken_mid_dialog_returns_collected_lines() {
    let (_dir, mut bot) = common::test_bot();
    say(&mut bot, "alice", "kitchen", "!add-item cake | sweet");
    say(&mut bot, "alice", "kitchen", "5 sugar");
    say(&mut bot, "alice", "kitchen", "2 flour");
    common::add_item(&mut bot, "bob", "cake", "plain", &["1 egg"]);

    let panel = only(say(&mut bot, "alice", "kitchen", "done"));
    assert_eq!(panel.tone, Tone::Error);
    assert_eq!(
        panel.description,
        "Item 'cake' already exists. Try updating it instead."
    );
    let collected = panel
        .fields
        .iter()
        .find(|f| f.name == "Collected ingredients")
        .expect("collected field");
    assert_eq!(collected.value, "5 sugar, 2 flour");

    assert!(bot.sessions().is_empty());
    let cake = bot.store().get_item("cake").unwrap();
    assert_eq!(cake.ingredients, "1 egg");
    assert_eq!(cake.created_by, "bob");
}
