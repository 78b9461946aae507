//! Per-command policy, independent of the Telegram transport.
//!
//! Every user-touching command relies on the same idempotent resolution:
//! try to create the account and, if the service reports that it already
//! exists, fetch it instead. Any other failure propagates to the caller.

use crate::api::QuotesApi;
use crate::error::ApiError;
use crate::models::{Quote, User};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Create-or-fetch the account for `telegram_id`.
pub async fn resolve_user<A: QuotesApi>(
    api: &A,
    name: &str,
    telegram_id: u64,
) -> Result<User, ApiError> {
    match api.create_user(name, telegram_id).await {
        Ok(user) => Ok(user),
        Err(ApiError::Conflict(_)) => {
            tracing::debug!(telegram_id, "User already exists, fetching");
            api.get_user(telegram_id).await
        }
        Err(e) => Err(e),
    }
}

/// Create the account if it does not exist yet.
///
/// Returns `None` when the account was already there.
pub async fn register<A: QuotesApi>(
    api: &A,
    name: &str,
    telegram_id: u64,
) -> Result<Option<User>, ApiError> {
    match api.create_user(name, telegram_id).await {
        Ok(user) => {
            tracing::info!(telegram_id, "Registered new user");
            Ok(Some(user))
        }
        Err(ApiError::Conflict(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AddQuote {
    /// No quote text was given; nothing was sent to the service.
    Usage,
    Added(Quote),
}

pub async fn add_quote<A: QuotesApi>(
    api: &A,
    name: &str,
    telegram_id: u64,
    text: &str,
) -> Result<AddQuote, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(AddQuote::Usage);
    }

    let user = resolve_user(api, name, telegram_id).await?;
    let quote = api.add_quote(text, &user.api_key).await?;
    tracing::info!(telegram_id, quote_id = %quote.id, "Quote added");
    Ok(AddQuote::Added(quote))
}

/// Inline query offsets are opaque strings; anything that is not a number means "start".
pub fn parse_offset(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

#[derive(Debug)]
pub struct QuotesPage {
    pub offset: u32,
    pub quotes: Vec<Quote>,
    pub next_offset: u32,
}

pub async fn quotes_page<A: QuotesApi>(
    api: &A,
    raw_offset: &str,
    page_size: u32,
) -> Result<QuotesPage, ApiError> {
    let offset = parse_offset(raw_offset);
    let quotes = api.quotes(offset, page_size).await?;
    Ok(QuotesPage {
        offset,
        quotes,
        next_offset: offset.saturating_add(page_size),
    })
}
