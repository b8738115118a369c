//! Terminal input parsing

/// Seed text for `/new` without an argument
pub const DEFAULT_SEED: &str = "Start a new conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send on the active conversation
    Say(String),
    New(String),
    List,
    Resume(String),
    Delete(String),
    Help,
    Quit,
    /// A slash command that could not be understood
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Command::Say(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("new", "") => Command::New(DEFAULT_SEED.to_string()),
            ("new", seed) => Command::New(seed.to_string()),
            ("list", _) => Command::List,
            ("resume", "") | ("delete", "") => {
                Command::Invalid(format!("/{name} needs a conversation id"))
            }
            ("resume", id) => Command::Resume(id.to_string()),
            ("delete", id) => Command::Delete(id.to_string()),
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => Command::Invalid(format!("unknown command /{name}")),
        }
    }
}

pub const HELP: &str = "\
Type a message and press enter to send it.
  /new [text]    start a conversation
  /list          show conversations
  /resume <id>   switch to a conversation
  /delete <id>   delete a conversation
  /quit          exit";
