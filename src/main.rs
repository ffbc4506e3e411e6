mod commands;
mod handlers;

use handlers::BotState;
use log::{error, info};
use rank_bote::config::Config;
use rank_bote::db::Database;
use rank_bote::tracker::Tracker;
use serenity::async_trait;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

struct Bot {
    state: Arc<BotState>,
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let state = Arc::clone(&self.state);

        // Spawn a task to handle the interaction concurrently
        tokio::spawn(async move {
            handlers::handle_interaction(&state, &ctx, interaction).await;
        });
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let commands = Command::set_global_application_commands(&ctx.http, |builder| {
            commands::create_commands(builder)
        })
        .await;

        if let Err(why) = commands {
            error!("Failed to register slash commands: {:?}", why);
        } else {
            info!("Successfully registered global slash commands.");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let database = match Database::new(&config.database_url).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };
    info!(
        "Storing rosters under '{}' with {:?} export labels",
        config.storage_key, config.export_locale
    );

    let state = Arc::new(BotState {
        tracker: Tracker::new(database, config.storage_key.clone(), config.export_locale),
        max_import_bytes: config.max_import_bytes,
    });

    let intents = GatewayIntents::GUILDS | GatewayIntents::DIRECT_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Bot { state })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Error creating client: {}", e);
            return;
        }
    };

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
