//! Command decoding and message routing
//!
//! Commands are a fixed, closed set; anything else is rejected at decode
//! time and echoed back to the user. Routing is a pure decision over the
//! decoded command and the user's credential state, so the whole tree is
//! unit-testable without touching the network.

/// The fixed command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stop,
    About,
    Database,
    Reauth,
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        match text {
            "/start" => Some(Command::Start),
            "/help" => Some(Command::Help),
            "/stop" => Some(Command::Stop),
            "/about" => Some(Command::About),
            "/database" => Some(Command::Database),
            "/reauth" => Some(Command::Reauth),
            _ => None,
        }
    }

    /// Commands that only make sense once a Notion credential exists.
    pub fn requires_auth(self) -> bool {
        matches!(self, Command::Database)
    }
}

/// Where a message should go, decided before any side effects run.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// Run a known command's handler.
    Command(Command),
    /// Known command, but it needs a credential the user does not have.
    CommandNeedsAuth(Command),
    /// Echo back the unrecognized command text.
    UnknownCommand(&'a str),
    /// Plain message from an unauthenticated user: ask them to connect.
    PromptAuth,
    /// Credential exists but no database selected yet: run selection.
    ChooseDatabase,
    /// Fully set up: file the message away.
    Relay,
}

pub fn route_message<'a>(
    command_text: Option<&'a str>,
    has_credential: bool,
    has_database: bool,
) -> Route<'a> {
    match command_text {
        Some(text) => match Command::parse(text) {
            Some(cmd) if cmd.requires_auth() && !has_credential => Route::CommandNeedsAuth(cmd),
            Some(cmd) => Route::Command(cmd),
            None => Route::UnknownCommand(text),
        },
        None if !has_credential => Route::PromptAuth,
        None if !has_database => Route::ChooseDatabase,
        None => Route::Relay,
    }
}
