#![allow(async_fn_in_trait)]

pub mod app_config;
pub mod errors;
pub mod events;
pub mod helper_methods;
pub mod irc_chat;
pub mod logging;
pub mod users;
