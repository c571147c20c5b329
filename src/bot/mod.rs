//! # Bot Front-End Module
//!
//! Everything between the transport and the crafting core: command parsing,
//! handlers, the panel presentation contract and the event loop.
//!
//! ## Components
//!
//! - [`server`] - [`RecipeBot`], event routing, idle sweep and console run loop
//! - [`parser`] - prefix command recognition
//! - [`commands`] - command handlers and dialog resolution
//! - [`panel`] - panels, controls and the control-id codec
//! - [`help`] - static help listing
//! - [`console`] - `user@channel> text` line transport
//!
//! ## Event Flow
//!
//! ```text
//! ┌─────────────────┐
//! │  console line   │ → InboundEvent { author, channel, Text | Selection }
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  RecipeBot      │ → command? dispatch : feed the author's dialog
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Panels         │ → rendered back to the channel
//! └─────────────────┘
//! ```

pub mod commands;
pub mod console;
pub mod help;
pub mod panel;
pub mod parser;
pub mod server;

pub use panel::{Control, ControlAction, Panel, Tone};
pub use parser::{CommandName, CommandParser, ParsedCommand};
pub use server::{EventKind, InboundEvent, Notice, RecipeBot};
