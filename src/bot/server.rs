//! # Bot Server - event routing and run loop
//!
//! [`RecipeBot`] owns the configuration, the [`CatalogStore`] and the
//! [`SessionTable`]. Each inbound event is processed to completion before the
//! next one is read, so neither the store nor the session table needs any
//! locking.
//!
//! ## Routing
//!
//! - text starting with the command prefix is parsed and dispatched as a command
//! - any other text is a dialog reply for the author's session in that channel
//!   (ignored when there is none)
//! - a selection carries a control id produced by [`ControlAction`]
//!
//! Handler errors become error panels; the bot keeps serving.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reciperanger::bot::RecipeBot;
//! use reciperanger::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut bot = RecipeBot::open(config)?;
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     bot.run_console(stdin, tokio::io::stdout()).await
//! }
//! ```

use std::time::Duration as StdDuration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::bot::commands::{expired_notice, CommandContext, CommandProcessor};
use crate::bot::console;
use crate::bot::panel::{ControlAction, Panel};
use crate::bot::parser::{CommandParser, ParsedCommand};
use crate::config::Config;
use crate::crafting::session::{SessionKey, SessionTable};
use crate::crafting::storage::CatalogStore;
use crate::crafting::CraftError;
use crate::logutil::escape_log;
use crate::metrics;

/// How often the run loop looks for idle dialogs.
const SWEEP_INTERVAL_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A message typed in a channel.
    Text(String),
    /// A control selected by the author; carries the control id.
    Selection(String),
}

/// One inbound event from the front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub author: String,
    pub channel: String,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(author: impl Into<String>, channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn selection(
        author: impl Into<String>,
        channel: impl Into<String>,
        control_id: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            kind: EventKind::Selection(control_id.into()),
        }
    }
}

/// A notice addressed to a dialog owner outside the request/reply flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub key: SessionKey,
    pub panel: Panel,
}

pub struct RecipeBot {
    config: Config,
    store: CatalogStore,
    sessions: SessionTable,
    parser: CommandParser,
    processor: CommandProcessor,
}

impl RecipeBot {
    pub fn new(config: Config, store: CatalogStore) -> Self {
        let sessions = SessionTable::new(
            Duration::minutes(i64::from(config.bot.session_timeout)),
            config.bot.max_collected_lines,
        );
        let parser = CommandParser::new(config.bot.command_prefix.clone());
        Self {
            config,
            store,
            sessions,
            parser,
            processor: CommandProcessor::new(),
        }
    }

    /// Open the catalog named by the configuration and build a bot around it.
    pub fn open(config: Config) -> Result<Self> {
        let path = config.storage.catalog_path();
        let store = CatalogStore::open(&path)
            .map_err(|e| anyhow!("Failed to open catalog at {}: {}", path.display(), e))?;
        info!("Catalog opened at {}", path.display());
        Ok(Self::new(config, store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn handle_event(&mut self, event: &InboundEvent) -> Vec<Panel> {
        self.handle_event_at(event, Utc::now())
    }

    /// Process one event at `now`. Never fails: errors are rendered as panels.
    pub fn handle_event_at(&mut self, event: &InboundEvent, now: DateTime<Utc>) -> Vec<Panel> {
        let result = match &event.kind {
            EventKind::Text(text) => self.handle_text(&event.author, &event.channel, text, now),
            EventKind::Selection(id) => self.handle_selection(&event.author, &event.channel, id, now),
        };
        match result {
            Ok(panels) => panels,
            Err(e) => {
                if e.is_store_error() {
                    metrics::inc_store_errors();
                    error!(
                        "store error serving {}@{}: {}",
                        escape_log(&event.author),
                        escape_log(&event.channel),
                        e
                    );
                } else {
                    debug!("request rejected: {}", e);
                }
                vec![Panel::error(e.to_string())]
            }
        }
    }

    fn handle_text(
        &mut self,
        author: &str,
        channel: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Panel>, CraftError> {
        let mut ctx = CommandContext {
            store: &self.store,
            sessions: &mut self.sessions,
            bot: &self.config.bot,
            author,
            channel,
            now,
        };
        match self.parser.parse(text) {
            ParsedCommand::NotACommand => self.processor.reply(&mut ctx, text),
            ParsedCommand::Unknown(name) => Ok(vec![Panel::error(format!(
                "Unknown command '{}'. Type {}help for a list of commands.",
                name,
                self.parser.prefix()
            ))]),
            ParsedCommand::Command { name, args } => {
                metrics::inc_commands_handled();
                let result = self.processor.process(&mut ctx, name, &args);
                if result.is_err() {
                    metrics::inc_commands_failed();
                }
                result
            }
        }
    }

    fn handle_selection(
        &mut self,
        author: &str,
        channel: &str,
        control_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Panel>, CraftError> {
        let action: ControlAction = match control_id.parse() {
            Ok(action) => action,
            Err(e) => {
                warn!("{}@{} selected {}", escape_log(author), escape_log(channel), e);
                return Ok(vec![Panel::error("That control is no longer available.")]);
            }
        };
        let mut ctx = CommandContext {
            store: &self.store,
            sessions: &mut self.sessions,
            bot: &self.config.bot,
            author,
            channel,
            now,
        };
        self.processor.select(&mut ctx, action)
    }

    pub fn sweep_idle(&mut self) -> Vec<Notice> {
        self.sweep_idle_at(Utc::now())
    }

    /// Cancel every dialog idle past the timeout and build a notice for its owner.
    pub fn sweep_idle_at(&mut self, now: DateTime<Utc>) -> Vec<Notice> {
        let timeout = self.config.bot.session_timeout;
        self.sessions
            .expire_idle_at(now)
            .into_iter()
            .map(|session| Notice {
                panel: expired_notice(&session, timeout),
                key: session.key,
            })
            .collect()
    }

    /// Close open dialogs without committing and flush the store.
    pub fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down {}...", self.config.bot.name);
        let drained = self.sessions.drain();
        if !drained.is_empty() {
            info!("Closed {} open dialog(s)", drained.len());
        }
        self.store
            .flush()
            .map_err(|e| anyhow!("Failed to flush catalog: {}", e))?;
        let stats = metrics::snapshot();
        info!(
            "{} shutdown complete: commands={} failed={} store_errors={}",
            self.config.bot.name, stats.commands_handled, stats.commands_failed, stats.store_errors
        );
        for (kind, counter) in stats.sessions {
            debug!(
                "dialog {}: started={} committed={} cancelled={} expired={} peak={}",
                kind,
                counter.started,
                counter.committed,
                counter.cancelled,
                counter.expired,
                counter.concurrent_peak
            );
        }
        Ok(())
    }

    /// Serve console lines from `reader` until EOF or Ctrl-C, writing replies to `writer`.
    pub async fn run_console<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "{} listening on console (prefix '{}')",
            self.config.bot.name, self.config.bot.command_prefix
        );
        let mut lines = reader.lines();
        let mut sweep = tokio::time::interval(StdDuration::from_secs(SWEEP_INTERVAL_SECS));
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    for notice in self.sweep_idle() {
                        let text = console::render_notice(&notice);
                        writer.write_all(text.as_bytes()).await?;
                    }
                    writer.flush().await?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("console input closed");
                        break;
                    };
                    let Some(event) = console::parse_line(&line, &self.config.console) else {
                        continue;
                    };
                    for panel in self.handle_event(&event) {
                        writer.write_all(console::render_panel(&panel).as_bytes()).await?;
                    }
                    writer.flush().await?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown()
    }
}
