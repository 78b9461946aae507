use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Quotes bot commands:")]
pub enum Command {
    #[command(description = "Create your account and show the welcome message")]
    Start,
    #[command(description = "Show your API key")]
    Key,
    #[command(description = "Sync your name and avatar with the API")]
    Update,
    #[command(description = "Issue a new API key")]
    Revoke,
    #[command(description = "Delete your account and quotes")]
    Delete,
    #[command(description = "Add a quote: /add your-quote")]
    Add(String),
    #[command(description = "Show this message")]
    Help,
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Key => "key",
            Self::Update => "update",
            Self::Revoke => "revoke",
            Self::Delete => "delete",
            Self::Add(_) => "add",
            Self::Help => "help",
        }
    }
}
