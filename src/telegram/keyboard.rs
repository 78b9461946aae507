use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// One button that opens inline quote browsing in the current chat.
pub fn quotes_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::switch_inline_query_current_chat("Quotes", ""),
    ]])
}
