pub mod confirm;
pub mod render;

use confirm::Decision;
use log::{error, info, warn};
use rank_bote::store::Destructive;
use rank_bote::tracker::Tracker;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::*;

/// Shared by every interaction task.
pub struct BotState {
    pub tracker: Tracker,
    pub max_import_bytes: u64,
}

/// Each guild keeps one roster; direct messages get one per user.
pub fn scope_of(guild_id: Option<GuildId>, user_id: UserId) -> String {
    match guild_id {
        Some(guild_id) => format!("guild-{}", guild_id),
        None => format!("user-{}", user_id),
    }
}

// Confirm / Cancel buttons from a destructive prompt
pub async fn handle_component(
    state: &BotState,
    ctx: &Context,
    component: &MessageComponentInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let custom_id = &component.data.custom_id;
    info!("Received component interaction: {}", custom_id);
    let scope = scope_of(component.guild_id, component.user.id);

    let content = match confirm::parse_decision(custom_id) {
        Some(Decision::Confirm(action)) => {
            let done = match &action {
                Destructive::DeleteGroup { .. } => "Group deleted.",
                Destructive::ClearAll => "All data was reset to the starting roster.",
            };
            let changed = state.tracker.apply(&scope, |roster| action.apply(roster)).await;
            if changed {
                done
            } else {
                "That group no longer exists. Nothing changed."
            }
        }
        Some(Decision::Cancel) => "Cancelled. Nothing changed.",
        None => {
            warn!("Unhandled component custom_id: {}", custom_id);
            component
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| message.content("Unknown button action.").ephemeral(true))
                })
                .await?;
            return Ok(());
        }
    };

    // Replace the prompt so the buttons can't be pressed twice
    component
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::UpdateMessage)
                .interaction_response_data(|message| message.content(content).components(|c| c))
        })
        .await?;
    Ok(())
}

pub async fn handle_interaction(state: &BotState, ctx: &Context, interaction: Interaction) {
    let result = match interaction {
        Interaction::ApplicationCommand(command) => {
            info!("Received command: {}", command.data.name);
            crate::commands::handle_command(state, ctx, &command).await
        }
        Interaction::MessageComponent(component) => handle_component(state, ctx, &component).await,
        _ => {
            warn!("Unhandled interaction type: {:?}", interaction.kind());
            Ok(())
        }
    };

    if let Err(why) = result {
        error!("Interaction handler error: {:?}", why);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_follows_guild_then_user() {
        assert_eq!(scope_of(Some(GuildId(42)), UserId(7)), "guild-42");
        assert_eq!(scope_of(None, UserId(7)), "user-7");
    }
}
