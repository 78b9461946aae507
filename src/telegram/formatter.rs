use crate::models::{Quote, User};
use reqwest::Url;

pub const ACCOUNT_UPDATED: &str = "Account details updated";
pub const ACCOUNT_DELETED: &str = "Your account has been deleted";
pub const ADD_USAGE: &str = "Usage: /add your-quote";

pub fn welcome_message(docs_url: &Url, source_url: Option<&str>) -> String {
    let source = source_url
        .map(|url| format!("Source code: {}\n", escape_html(url)))
        .unwrap_or_default();
    format!(
        "This is a quotes bot.\n\n\
         API docs: {docs}\n\
         {source}\
         Get your key: /key\n\
         Issue a new key: /revoke\n\
         Update your account (after a name change): /update\n\
         Delete your account (and quotes): /delete\n\n\
         Add a quote: /add your-quote\n\n\
         Press the Quotes button to browse quotes.",
        docs = escape_html(docs_url.as_str()),
    )
}

/// Only ever sent to the key's owner.
pub fn key_message(user: &User) -> String {
    format!("Your key: {}", code(&user.api_key))
}

pub fn new_key_message(user: &User) -> String {
    format!("Your new key: {}", code(&user.api_key))
}

pub fn quote_added_message(quote_url: &Url) -> String {
    format!("Quote {}", link("added", quote_url))
}

pub fn inline_title(quote: &Quote) -> String {
    format!("{}:", quote.author.name)
}

/// Message body posted to the chat when an inline result is picked.
pub fn inline_message(quote: &Quote, quote_url: &Url) -> String {
    format!(
        "{text} (C) {author}\n\n{link}",
        text = escape_html(&quote.text),
        author = escape_html(&quote.author.name),
        link = link("View via API", quote_url),
    )
}

fn code(s: &str) -> String {
    format!("<code>{}</code>", escape_html(s))
}

fn link(text: &str, url: &Url) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(url.as_str()),
        escape_html(text)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
