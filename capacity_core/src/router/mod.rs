//! # Command Router
//!
//! Owns the two-mode conversational state and turns each input line into a
//! response string.
//!
//! ```text
//!            "!mode design"
//!   ┌──────┐ ─────────────► ┌────────┐
//!   │ Chat │                │ Design │
//!   └──────┘ ◄───────────── └────────┘
//!             "!mode chat"
//! ```
//!
//! - `!mode ...` lines switch mode (or report an unknown mode) in either state
//! - In `Chat`, every other line goes verbatim to the [`ChatService`]
//! - In `Design`, lines are parsed into a [`Command`] and run against the
//!   store and the formula engine
//!
//! Lines are processed one at a time to completion. Every failure except an
//! unreachable store is rendered as response text.

pub mod command;

use tracing::{debug, info, warn};

use crate::chat::{ChatService, ConversationLog, SYSTEM_PROMPT};
use crate::elements::find_property;
use crate::errors::{DesignError, DesignResult};
use crate::formulas::{calculate, formula_names};
use crate::store::PropertyStore;

pub use command::{parse_value, Command, Mode, ModeSwitch};

/// Startup banner shown by the REPL
pub const BANNER: &str = "Structural Design AI. Use '!mode design' to switch to design mode or '!mode chat' for general chat. Type 'exit' to quit.";

/// Acknowledgement for `!mode design`
pub const DESIGN_MODE_HELP: &str = "[Structural Design Mode]
Available commands:
- check element all
- check element [elementName]
- check element [elementName] [propertyName]
- edit element [elementName] [propertyName] [value]
- check formula all
- calculate [elementName] [formulaName]

Type 'exit' to leave this mode.";

/// Acknowledgement for `!mode chat`
pub const CHAT_MODE_ACK: &str = "Switched to General Chat Mode.";

/// Reply to an unrecognised `!mode ...` line
pub const UNKNOWN_MODE: &str = "Unknown mode. Use '!mode design' or '!mode chat'.";

/// One operator session: mode, conversation log and collaborators.
pub struct Session {
    store: Box<dyn PropertyStore>,
    chat: Box<dyn ChatService>,
    mode: Mode,
    log: ConversationLog,
}

impl Session {
    /// New session in `Chat` mode with a log seeded by the system prompt.
    pub fn new(store: Box<dyn PropertyStore>, chat: Box<dyn ChatService>) -> Self {
        Self {
            store,
            chat,
            mode: Mode::Chat,
            log: ConversationLog::with_system(SYSTEM_PROMPT),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Input prompt for the current mode, e.g. `[DESIGN MODE] User: `
    pub fn prompt(&self) -> String {
        format!("[{} MODE] User: ", self.mode.label())
    }

    /// Process one input line.
    ///
    /// Only fatal store failures are returned as `Err`; every other outcome,
    /// including not-found and invalid input, is an `Ok` response line. Each
    /// processed line and its response are appended to the conversation log.
    pub async fn handle_line(&mut self, line: &str) -> DesignResult<String> {
        if let Some(switch) = ModeSwitch::parse(line) {
            let reply = self.switch_mode(switch);
            self.record(line, &reply);
            return Ok(reply);
        }

        let reply = match self.mode {
            Mode::Design => {
                let reply = recover(self.run_design(line).await)?;
                self.record(line, &reply);
                reply
            }
            Mode::Chat => self.chat(line).await,
        };
        Ok(reply)
    }

    fn record(&mut self, line: &str, reply: &str) {
        self.log.push_user(line);
        self.log.push_assistant(reply);
    }

    fn switch_mode(&mut self, switch: ModeSwitch) -> String {
        match switch {
            ModeSwitch::To(mode) => {
                info!(from = ?self.mode, to = ?mode, "mode switched");
                self.mode = mode;
                match mode {
                    Mode::Design => DESIGN_MODE_HELP.to_string(),
                    Mode::Chat => CHAT_MODE_ACK.to_string(),
                }
            }
            ModeSwitch::Unknown => UNKNOWN_MODE.to_string(),
        }
    }

    async fn chat(&mut self, line: &str) -> String {
        self.log.push_user(line);
        let reply = match self.chat.send(&self.log).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "chat service failed");
                error.to_string()
            }
        };
        self.log.push_assistant(reply.as_str());
        reply
    }

    async fn run_design(&self, line: &str) -> DesignResult<String> {
        let command = Command::parse(line)?;
        debug!(?command, "design command");
        self.execute(command).await
    }

    /// Run a parsed design command.
    pub async fn execute(&self, command: Command) -> DesignResult<String> {
        match command {
            Command::ListElements => self.list_elements().await,
            Command::ShowElement { element } => self.show_element(&element).await,
            Command::ShowProperty { element, property } => self.show_property(&element, &property).await,
            Command::EditProperty {
                element,
                property,
                value,
            } => self.edit_property(&element, &property, &value).await,
            Command::ListFormulas => Ok(list("Available formulas:", formula_names())),
            Command::Calculate { element, formula } => self.calculate(&element, &formula).await,
        }
    }

    async fn list_elements(&self) -> DesignResult<String> {
        let names = self.store.list_all_element_names().await?;
        if names.is_empty() {
            return Ok("No elements available.".to_string());
        }
        Ok(list("Available elements:", names.iter().map(String::as_str)))
    }

    async fn show_element(&self, element: &str) -> DesignResult<String> {
        let properties = self.store.get_properties(element).await?;
        let header = format!("{} properties:", element);
        let lines: Vec<String> = properties
            .iter()
            .map(|p| format!("{} ({})", p.name, p.unit))
            .collect();
        Ok(list(&header, lines.iter().map(String::as_str)))
    }

    async fn show_property(&self, element: &str, property: &str) -> DesignResult<String> {
        let properties = self.store.get_properties(element).await?;
        let found = find_property(&properties, property)
            .ok_or_else(|| DesignError::property_not_found(element, property))?;
        Ok(format!("{} - {}: {} {}", element, found.name, found.value, found.unit))
    }

    async fn edit_property(&self, element: &str, property: &str, raw_value: &str) -> DesignResult<String> {
        let value = parse_value(raw_value)?;
        let properties = self.store.get_properties(element).await?;
        if find_property(&properties, property).is_none() {
            return Err(DesignError::property_not_found(element, property));
        }
        if !self.store.update_property(element, property, value).await? {
            return Err(DesignError::update_declined(element, property));
        }
        Ok(format!("{}'s '{}' updated to {}.", element, property, value))
    }

    async fn calculate(&self, element: &str, formula: &str) -> DesignResult<String> {
        let properties = self.store.get_properties(element).await?;
        Ok(calculate(formula, &properties).summary(element))
    }
}

/// Render a header followed by `- item` lines
fn list<'a>(header: &str, items: impl Iterator<Item = &'a str>) -> String {
    let mut out = header.to_string();
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
    }
    out
}

/// Turn recoverable errors into response text; pass fatal ones through.
fn recover(result: DesignResult<String>) -> DesignResult<String> {
    match result {
        Ok(reply) => Ok(reply),
        Err(error) if error.is_fatal() => {
            warn!(%error, "fatal store error");
            Err(error)
        }
        Err(error) => Ok(error.to_string()),
    }
}
