pub mod commands;
pub mod formatter;
pub mod handler;
pub mod keyboard;
