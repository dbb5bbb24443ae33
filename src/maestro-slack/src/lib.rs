//! Slack slash commands for tabletop sessions.
//!
//! Two commands are supported:
//! - `/roll <num-dice> d<sides>` - roll dice and post the total
//! - `/spell <spell name>` - look a spell up and post its attributes
//!
//! # Pipeline
//!
//! A raw request body goes through [`payload::decode`], is routed by
//! [`commands::route`] to a [`actions::DndAction`], and the action's
//! [`messages::SlashCommandResponse`] is serialized for Slack. Spell lookups
//! go through a [`sources::SpellSource`]: either a JSON API or HTML pages
//! read with the [`extract`] module.
//!
//! # Example
//!
//! ```rust,ignore
//! use maestro_slack::{CommandHandler, MaestroConfig};
//!
//! let config = MaestroConfig::from_env()?;
//! let handler = CommandHandler::new(&config)?;
//! let response = handler.handle(body, false).await;
//! ```
//!
//! # Configuration
//!
//! See [`MaestroConfig::from_env`] for the environment variables read.

pub mod actions;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod messages;
pub mod payload;
pub mod record;
pub mod sources;
pub mod webhook;

// Re-export main types
pub use actions::{DiceRoll, DiceSpec, DndAction, IdentifySpell, SpellQuery};
pub use commands::ActionKind;
pub use config::{MaestroConfig, SourceFormat};
pub use error::{ActionError, ActionResult, ErrorKind};
pub use handler::{CommandHandler, HandlerResponse, SERVICE_ERROR_BODY};
pub use messages::{SlashCommandResponse, format_grid, format_spell_response};
pub use payload::{CommandEnvelope, decode};
pub use record::{FieldRecord, SpellField, SpellSheet};
pub use sources::{Open5eSource, SpellSource, StatblockSource};
pub use webhook::WebhookNotifier;
