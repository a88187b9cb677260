pub mod commands;
pub mod forward_callback;
pub mod telegram_client;
pub mod update_handler;
