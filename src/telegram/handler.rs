use crate::actions::{self, AddQuote, QuotesPage};
use crate::api::{ApiClient, QuotesApi};
use crate::config::Config;
use crate::error::HandlerError;
use crate::models::{Quote, UserUpdate};
use crate::telegram::commands::Command;
use crate::telegram::{formatter, keyboard};
use reqwest::Url;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText, ParseMode, UserId,
};
use teloxide::utils::command::BotCommands;

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    api: Arc<ApiClient>,
    config: Arc<Config>,
) -> Result<(), HandlerError> {
    // Channel posts carry no sender; there is no account to act on.
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let telegram_id = from.id.0;
    let name = from.full_name();
    tracing::info!(telegram_id, command = cmd.name(), "Handling command");

    let chat_id = msg.chat.id;
    let api = api.as_ref();

    match cmd {
        Command::Start => {
            actions::register(api, &name, telegram_id).await?;
            let docs_url = api.url("docs/")?;
            let welcome = formatter::welcome_message(&docs_url, config.source_url.as_deref());
            bot.send_message(chat_id, welcome)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard::quotes_keyboard())
                .await?;
        }
        Command::Key => {
            let user = actions::resolve_user(api, &name, telegram_id).await?;
            send_html(&bot, chat_id, formatter::key_message(&user)).await?;
        }
        Command::Update => {
            let avatar = current_avatar(&bot, from.id).await;
            api.update_user(&UserUpdate {
                name: &name,
                telegram_id,
                avatar: avatar.as_deref(),
            })
            .await?;
            send_html(&bot, chat_id, formatter::ACCOUNT_UPDATED).await?;
        }
        Command::Revoke => {
            let user = api.revoke_api_key(telegram_id).await?;
            tracing::info!(telegram_id, "API key revoked");
            send_html(&bot, chat_id, formatter::new_key_message(&user)).await?;
        }
        Command::Delete => {
            api.delete_user(telegram_id).await?;
            tracing::info!(telegram_id, "User deleted");
            send_html(&bot, chat_id, formatter::ACCOUNT_DELETED).await?;
        }
        Command::Add(text) => match actions::add_quote(api, &name, telegram_id, &text).await? {
            AddQuote::Usage => {
                send_html(&bot, chat_id, formatter::ADD_USAGE).await?;
            }
            AddQuote::Added(quote) => {
                let url = api.quote_url(&quote.id)?;
                send_html(&bot, chat_id, formatter::quote_added_message(&url)).await?;
            }
        },
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
    }

    Ok(())
}

pub async fn handle_inline_query(
    bot: Bot,
    query: InlineQuery,
    api: Arc<ApiClient>,
    config: Arc<Config>,
) -> Result<(), HandlerError> {
    let page = actions::quotes_page(api.as_ref(), &query.offset, config.page_size).await?;
    tracing::debug!(
        telegram_id = query.from.id.0,
        offset = page.offset,
        count = page.quotes.len(),
        "Answering inline query"
    );

    let results = page
        .quotes
        .iter()
        .map(|quote| quote_article(api.as_ref(), quote))
        .collect::<Result<Vec<_>, _>>()?;

    bot.answer_inline_query(query.id.clone(), results)
        .next_offset(next_offset_token(&page))
        .cache_time(0)
        .await?;

    Ok(())
}

fn next_offset_token(page: &QuotesPage) -> String {
    page.next_offset.to_string()
}

fn quote_article<A: QuotesApi>(api: &A, quote: &Quote) -> Result<InlineQueryResult, HandlerError> {
    let url = api.quote_url(&quote.id)?;

    let mut content = InputMessageContentText::new(formatter::inline_message(quote, &url));
    content.parse_mode = Some(ParseMode::Html);

    let mut article = InlineQueryResultArticle::new(
        quote.id.clone(),
        formatter::inline_title(quote),
        InputMessageContent::Text(content),
    );
    article.description = Some(quote.text.clone());
    article.thumbnail_url = quote
        .author
        .avatar
        .as_deref()
        .and_then(|avatar| Url::parse(avatar).ok());

    Ok(InlineQueryResult::Article(article))
}

/// File id of the largest size of the user's most recent profile photo.
async fn current_avatar(bot: &Bot, user_id: UserId) -> Option<String> {
    match bot.get_user_profile_photos(user_id).limit(1).await {
        Ok(photos) => photos
            .photos
            .first()
            .and_then(|sizes| sizes.last())
            .map(|size| size.file.id.to_string()),
        Err(e) => {
            tracing::warn!(telegram_id = user_id.0, "Failed to read profile photos: {e}");
            None
        }
    }
}

async fn send_html(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
) -> Result<(), teloxide::RequestError> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
