use std::time::Duration;
use tokio::sync::mpsc;
use twitch_chat_events::app_config::config::APP_CONFIG;
use twitch_chat_events::errors::AppError;
use twitch_chat_events::events::Event;
use twitch_chat_events::irc_chat::TwitchIrc;
use twitch_chat_events::users::helix::HelixResolver;

#[tokio::main]
async fn main() {
  twitch_chat_events::logging::setup_logging_config().unwrap();

  if APP_CONFIG.channels().is_empty() {
    println!("No channels to join.");

    std::process::exit(0);
  }

  let (event_sender, event_receiver) = mpsc::unbounded_channel();

  tokio::spawn(log_dispatched_events(event_receiver));

  let resolver = HelixResolver::new();
  let mut irc_client = TwitchIrc::new(resolver, event_sender).await.unwrap();

  loop {
    match irc_client.next_message().await {
      Err(AppError::LoginAuthenticationFailed) => {
        tracing::error!("Login authentication failed. Check the configured access token.");

        std::process::exit(1);
      }

      Err(AppError::IrcError(irc::error::Error::PingTimeout)) => {
        tracing::error!("=== PING TIMEOUT ERROR ===");

        if let Err(error) = irc_client.reconnect().await {
          tracing::error!("Failed to reconnect the IRC client. Reason: `{:?}`", error);

          tokio::time::sleep(Duration::from_secs(10)).await;
        }
      }

      Err(error) => {
        tracing::error!("Failed to handle a message from the IRC client: `{}`", error);
      }

      _ => (),
    }
  }
}

async fn log_dispatched_events(mut event_receiver: mpsc::UnboundedReceiver<Event>) {
  while let Some(event) = event_receiver.recv().await {
    tracing::info!("{:?}", event);
  }
}
