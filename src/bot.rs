use crate::api::ApiClient;
use crate::config::Config;
use crate::error::HandlerError;
use crate::telegram::commands::Command;
use crate::telegram::handler;
use std::sync::Arc;
use teloxide::dispatching::{ShutdownToken, UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub async fn run_bot(config: Config) -> anyhow::Result<()> {
    let bot = Bot::new(&config.telegram_bot_token);
    let api = Arc::new(ApiClient::new(&config.api_host, config.api_key.clone())?);
    let config = Arc::new(config);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {e}");
    }

    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![api.clone(), config])
        .default_handler(|update| async move {
            tracing::trace!(update_id = ?update.id, "Ignoring unsupported update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Update handler error"))
        .enable_ctrlc_handler()
        .build();

    spawn_signal_handler(dispatcher.shutdown_token());

    tracing::info!("Bot started. Listening for commands and inline queries...");
    dispatcher.dispatch().await;
    tracing::info!("Telegram dispatcher stopped");

    api.close();

    Ok(())
}

/// Commands go to [`handler::handle_command`], inline queries to
/// [`handler::handle_inline_query`]; everything else falls through to the
/// default handler.
pub fn schema() -> UpdateHandler<HandlerError> {
    let command_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handler::handle_command);

    let inline_handler = Update::filter_inline_query().endpoint(handler::handle_inline_query);

    dptree::entry()
        .branch(command_handler)
        .branch(inline_handler)
}

// Ctrl+C is handled by the dispatcher itself.
fn spawn_signal_handler(shutdown: ShutdownToken) {
    #[cfg(unix)]
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Failed to register SIGTERM handler: {e}");
                    return;
                }
            };
        if sigterm.recv().await.is_some() {
            tracing::info!("Received SIGTERM, shutting down...");
            match shutdown.shutdown() {
                Ok(done) => done.await,
                Err(e) => tracing::warn!("Dispatcher was not running: {e}"),
            }
        }
    });
    #[cfg(not(unix))]
    drop(shutdown);
}
