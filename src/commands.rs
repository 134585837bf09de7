//! Slash-command parsing for the line-oriented front-end.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Clear,
    Models,
    Model(String),
    KeySet(String),
    KeyClear,
    Fix { language_id: String, path: String },
    Quit,
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut words = trimmed.split_whitespace();
    let command = words.next().unwrap_or(trimmed).to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/clear" => SlashCommand::Clear,
        "/models" => SlashCommand::Models,
        "/model" => match words.next() {
            Some(model_id) => SlashCommand::Model(model_id.to_string()),
            None => SlashCommand::Unknown(command),
        },
        "/key" => match (words.next(), words.next()) {
            (Some("set"), Some(value)) => SlashCommand::KeySet(value.to_string()),
            (Some("clear"), None) => SlashCommand::KeyClear,
            _ => SlashCommand::Unknown(command),
        },
        "/fix" => match (words.next(), words.next()) {
            (Some(language_id), Some(path)) => SlashCommand::Fix {
                language_id: language_id.to_string(),
                path: path.to_string(),
            },
            _ => SlashCommand::Unknown(command),
        },
        "/quit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
