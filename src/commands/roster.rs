use crate::handlers::{confirm, render, scope_of, BotState};
use chrono::Utc;
use log::{error, info, warn};
use rank_bote::error::TranscodeError;
use rank_bote::scoring;
use rank_bote::store::{Destructive, RecordPatch};
use rank_bote::tracker::ImportOutcome;
use rank_bote::transcode::{ExportFormat, ImportFormat};
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption, CommandDataOptionValue,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{Attachment, AttachmentType};
use serenity::model::id::AttachmentId;
use serenity::prelude::*;
use std::borrow::Cow;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn group_option(option: &mut CreateApplicationCommandOption) -> &mut CreateApplicationCommandOption {
    option
        .name("group")
        .description("Group number, as listed by /roster show")
        .kind(CommandOptionType::Integer)
        .required(true)
}

fn record_option(option: &mut CreateApplicationCommandOption) -> &mut CreateApplicationCommandOption {
    option
        .name("record")
        .description("Record number within the group")
        .kind(CommandOptionType::Integer)
        .required(true)
}

pub fn create_roster_command(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("roster")
        .description("Track rank progress across groups")
        .create_option(|option| {
            option
                .name("show")
                .description("Show every group, its records and the current leader")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("add-group")
                .description("Add a group with one empty record")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("delete-group")
                .description("Delete a group")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| group_option(sub_option))
        })
        .create_option(|option| {
            option
                .name("rename-group")
                .description("Rename a group")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| group_option(sub_option))
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("name")
                        .description("New group name")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("add-record")
                .description("Add an empty record to a group")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| group_option(sub_option))
        })
        .create_option(|option| {
            option
                .name("update-record")
                .description("Change a record's name or ranks")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| group_option(sub_option))
                .create_sub_option(|sub_option| record_option(sub_option))
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("name")
                        .description("Participant name")
                        .kind(CommandOptionType::String)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("old_rank")
                        .description("Previous rank, or - to clear")
                        .kind(CommandOptionType::String)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("new_rank")
                        .description("Current rank, or - to clear")
                        .kind(CommandOptionType::String)
                })
        })
        .create_option(|option| {
            option
                .name("delete-record")
                .description("Delete a record from a group")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| group_option(sub_option))
                .create_sub_option(|sub_option| record_option(sub_option))
        })
        .create_option(|option| {
            option
                .name("clear")
                .description("Reset everything to the starting roster")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("export")
                .description("Download the data as JSON or as a spreadsheet report")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("format")
                        .description("File format")
                        .kind(CommandOptionType::String)
                        .add_string_choice("JSON", "json")
                        .add_string_choice("Excel report", "xlsx")
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("import")
                .description("Replace all data from a .json, .xlsx, .xls or .csv file")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("file")
                        .description("File to import")
                        .kind(CommandOptionType::Attachment)
                        .required(true)
                })
        })
}

pub async fn handle_roster_command(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> HandlerResult {
    // Get the subcommand
    let subcommand = match command.data.options.first() {
        Some(option) => option,
        None => {
            send_error_response(ctx, command, "No subcommand provided").await?;
            return Ok(());
        }
    };

    let scope = scope_of(command.guild_id, command.user.id);
    info!("roster {} requested by {} in scope {}", subcommand.name, command.user.name, scope);

    match subcommand.name.as_str() {
        "show" => handle_show(state, ctx, command, &scope).await?,
        "add-group" => handle_add_group(state, ctx, command, &scope).await?,
        "delete-group" => handle_delete_group(state, ctx, command, subcommand, &scope).await?,
        "rename-group" => handle_rename_group(state, ctx, command, subcommand, &scope).await?,
        "add-record" => handle_add_record(state, ctx, command, subcommand, &scope).await?,
        "update-record" => handle_update_record(state, ctx, command, subcommand, &scope).await?,
        "delete-record" => handle_delete_record(state, ctx, command, subcommand, &scope).await?,
        "clear" => ask_confirmation(ctx, command, &Destructive::ClearAll, None).await?,
        "export" => handle_export(state, ctx, command, subcommand, &scope).await?,
        "import" => handle_import(state, ctx, command, subcommand, &scope).await?,
        _ => {
            send_error_response(ctx, command, "Unknown subcommand").await?;
        }
    }

    Ok(())
}

// --- Option helpers ---

fn find_option<'a>(subcommand: &'a CommandDataOption, name: &str) -> Option<&'a CommandDataOption> {
    subcommand.options.iter().find(|option| option.name == name)
}

// 1-based position; anything below 1 is treated as absent
fn position_option(subcommand: &CommandDataOption, name: &str) -> Option<usize> {
    find_option(subcommand, name)
        .and_then(|option| option.value.as_ref())
        .and_then(|value| value.as_i64())
        .and_then(|value| usize::try_from(value).ok())
        .filter(|position| *position >= 1)
}

fn string_option(subcommand: &CommandDataOption, name: &str) -> Option<String> {
    find_option(subcommand, name)
        .and_then(|option| option.value.as_ref())
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn attachment_option<'a>(
    command: &'a ApplicationCommandInteraction,
    subcommand: &'a CommandDataOption,
    name: &str,
) -> Option<&'a Attachment> {
    let option = find_option(subcommand, name)?;
    if let Some(CommandDataOptionValue::Attachment(attachment)) = &option.resolved {
        return Some(attachment);
    }

    // Fall back to the interaction's resolved data, keyed by the option value
    let id = option
        .value
        .as_ref()
        .and_then(|value| value.as_str())
        .and_then(|value| value.parse::<u64>().ok())?;
    command.data.resolved.attachments.get(&AttachmentId(id))
}

// --- Responses ---

async fn respond(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: String,
    ephemeral: bool,
) -> Result<(), serenity::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(ephemeral))
        })
        .await
}

async fn send_error_response(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    error_message: &str,
) -> Result<(), serenity::Error> {
    respond(ctx, command, error_message.to_string(), true).await
}

// Status line followed by the refreshed listing
async fn respond_with_roster(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    scope: &str,
    status: &str,
) -> Result<(), serenity::Error> {
    let groups = state.tracker.snapshot(scope).await;
    let standings = scoring::standings(&groups);
    let content = render::clip(
        &format!("{}\n\n{}", status, render::render_roster(&groups, &standings, state.tracker.locale().labels())),
        render::MESSAGE_LIMIT,
    );
    respond(ctx, command, content, false).await
}

async fn ask_confirmation(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    action: &Destructive,
    group_name: Option<&str>,
) -> Result<(), serenity::Error> {
    let question = confirm::prompt(action, group_name);
    let confirm_id = confirm::confirm_id(action);
    let cancel_id = confirm::cancel_id(action);

    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message
                        .ephemeral(true)
                        .content(question)
                        .components(|c| {
                            c.create_action_row(|row| {
                                row.create_button(|btn| {
                                    btn.custom_id(confirm_id)
                                        .label("Confirm")
                                        .style(ButtonStyle::Danger)
                                });
                                row.create_button(|btn| {
                                    btn.custom_id(cancel_id)
                                        .label("Cancel")
                                        .style(ButtonStyle::Secondary)
                                })
                            })
                        })
                })
        })
        .await
}

// --- Subcommands ---

async fn handle_show(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    scope: &str,
) -> HandlerResult {
    let groups = state.tracker.snapshot(scope).await;
    let standings = scoring::standings(&groups);
    respond(ctx, command, render::render_roster(&groups, &standings, state.tracker.locale().labels()), false).await?;
    Ok(())
}

async fn handle_add_group(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    scope: &str,
) -> HandlerResult {
    let count = state
        .tracker
        .apply(scope, |roster| {
            roster.add_group();
            roster.groups().len()
        })
        .await;
    respond_with_roster(state, ctx, command, scope, &format!("Added group #{}.", count)).await?;
    Ok(())
}

async fn handle_delete_group(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let position = position_option(subcommand, "group");
    let target = state
        .tracker
        .inspect(scope, |roster| {
            position
                .and_then(|p| roster.group_id_at(p))
                .and_then(|id| roster.group(id))
                .map(|group| (group.id.clone(), group.name.clone()))
        })
        .await;

    match target {
        Some((group_id, name)) => {
            let action = Destructive::DeleteGroup { group_id };
            ask_confirmation(ctx, command, &action, Some(&name)).await?;
        }
        None => send_error_response(ctx, command, "There is no group with that number.").await?,
    }
    Ok(())
}

async fn handle_rename_group(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let position = position_option(subcommand, "group");
    let name = string_option(subcommand, "name").unwrap_or_default();

    let renamed = state
        .tracker
        .apply(scope, |roster| {
            let group_id = position.and_then(|p| roster.group_id_at(p)).map(str::to_string);
            match group_id {
                Some(group_id) => roster.rename_group(&group_id, &name),
                None => false,
            }
        })
        .await;

    if renamed {
        respond_with_roster(state, ctx, command, scope, "Group renamed.").await?;
    } else {
        send_error_response(ctx, command, "There is no group with that number.").await?;
    }
    Ok(())
}

async fn handle_add_record(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let position = position_option(subcommand, "group");

    let added = state
        .tracker
        .apply(scope, |roster| {
            let group_id = position.and_then(|p| roster.group_id_at(p)).map(str::to_string);
            group_id.and_then(|group_id| roster.add_record(&group_id))
        })
        .await;

    if added.is_some() {
        respond_with_roster(state, ctx, command, scope, "Record added.").await?;
    } else {
        send_error_response(ctx, command, "There is no group with that number.").await?;
    }
    Ok(())
}

async fn handle_update_record(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let group_position = position_option(subcommand, "group");
    let record_position = position_option(subcommand, "record");

    let ranks = string_option(subcommand, "old_rank")
        .map(|text| render::parse_rank_input(&text))
        .transpose()
        .and_then(|old_rank| {
            string_option(subcommand, "new_rank")
                .map(|text| render::parse_rank_input(&text))
                .transpose()
                .map(|new_rank| (old_rank, new_rank))
        });
    let (old_rank, new_rank) = match ranks {
        Ok(ranks) => ranks,
        Err(message) => {
            send_error_response(ctx, command, &message).await?;
            return Ok(());
        }
    };

    let patch = RecordPatch {
        name: string_option(subcommand, "name"),
        old_rank,
        new_rank,
    };
    if patch.is_empty() {
        send_error_response(ctx, command, "Give at least one of name, old_rank or new_rank.").await?;
        return Ok(());
    }

    let updated = state
        .tracker
        .apply(scope, |roster| {
            let ids = group_position
                .zip(record_position)
                .and_then(|(g, r)| roster.record_id_at(g, r))
                .map(|(group_id, record_id)| (group_id.to_string(), record_id.to_string()));
            match ids {
                Some((group_id, record_id)) => roster.update_record(&group_id, &record_id, patch),
                None => false,
            }
        })
        .await;

    if updated {
        respond_with_roster(state, ctx, command, scope, "Record updated.").await?;
    } else {
        send_error_response(ctx, command, "There is no record with that number.").await?;
    }
    Ok(())
}

async fn handle_delete_record(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let group_position = position_option(subcommand, "group");
    let record_position = position_option(subcommand, "record");

    let deleted = state
        .tracker
        .apply(scope, |roster| {
            let ids = group_position
                .zip(record_position)
                .and_then(|(g, r)| roster.record_id_at(g, r))
                .map(|(group_id, record_id)| (group_id.to_string(), record_id.to_string()));
            match ids {
                Some((group_id, record_id)) => roster.delete_record(&group_id, &record_id),
                None => false,
            }
        })
        .await;

    if deleted {
        respond_with_roster(state, ctx, command, scope, "Record deleted.").await?;
    } else {
        send_error_response(ctx, command, "There is no record with that number.").await?;
    }
    Ok(())
}

async fn handle_export(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let format = string_option(subcommand, "format")
        .and_then(|value| value.parse::<ExportFormat>().ok())
        .unwrap_or(ExportFormat::Json);

    let file = match state.tracker.export(scope, format, Utc::now().date_naive()).await {
        Ok(file) => file,
        Err(e) => {
            error!("Export for scope {} failed: {}", scope, e);
            send_error_response(ctx, command, "Export failed, please try again.").await?;
            return Ok(());
        }
    };
    info!("Exported {} ({} bytes) for scope {}", file.filename, file.bytes.len(), scope);

    let content = format!("Here is `{}`.", file.filename);
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message.content(content).add_file(AttachmentType::Bytes {
                        data: Cow::Owned(file.bytes),
                        filename: file.filename,
                    })
                })
        })
        .await?;
    Ok(())
}

async fn handle_import(
    state: &BotState,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    scope: &str,
) -> HandlerResult {
    let attachment = match attachment_option(command, subcommand, "file") {
        Some(attachment) => attachment,
        None => {
            send_error_response(ctx, command, "Attach a .json, .xlsx, .xls or .csv file.").await?;
            return Ok(());
        }
    };

    if ImportFormat::from_filename(&attachment.filename).is_none() {
        let e = TranscodeError::UnsupportedFormat {
            filename: attachment.filename.clone(),
        };
        send_error_response(ctx, command, &format!("Import failed: {}", e)).await?;
        return Ok(());
    }
    if attachment.size > state.max_import_bytes {
        let e = TranscodeError::TooLarge {
            size: attachment.size,
            limit: state.max_import_bytes,
        };
        send_error_response(ctx, command, &format!("Import failed: {}", e)).await?;
        return Ok(());
    }

    // Downloading can outlast the initial reply window
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                .interaction_response_data(|message| message.ephemeral(true))
        })
        .await?;

    let content = match attachment.download().await {
        Ok(bytes) => match state.tracker.import(scope, &attachment.filename, &bytes).await {
            Ok(ImportOutcome::Imported { groups, records }) => format!(
                "Imported {} group(s) with {} record(s) from `{}`. The previous data was replaced.",
                groups, records, attachment.filename
            ),
            Ok(ImportOutcome::NoValidData) => {
                "No valid data found in that file. Nothing was changed.".to_string()
            }
            Err(e) => format!("Import failed: {}. Nothing was changed.", e),
        },
        Err(e) => {
            warn!("Failed to download attachment {}: {}", attachment.filename, e);
            "Import failed: the file could not be downloaded. Nothing was changed.".to_string()
        }
    };

    command
        .create_followup_message(&ctx.http, |message| message.content(content).ephemeral(true))
        .await?;
    Ok(())
}
