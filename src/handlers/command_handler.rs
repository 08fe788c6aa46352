use log::{info, warn};
use teloxide::prelude::*;
use teloxide::utils::command::ParseError;

use crate::bot::{BotContext, Command, HandlerResult, ReplyTarget, TelegramBot};

/// keeps the whole argument string of `/start`, empty when there is none
pub fn parse_start_payload(input: String) -> Result<(String,), ParseError> {
    Ok((input,))
}

pub struct CommandHandler;

impl CommandHandler {
    pub async fn handle_command(ctx: BotContext, msg: Message, cmd: Command) -> HandlerResult {
        match cmd {
            Command::Start(payload) => {
                Self::handle_start_command(ctx, msg, payload).await?;
            }
        }
        Ok(())
    }

    async fn handle_start_command(ctx: BotContext, msg: Message, payload: String) -> HandlerResult {
        let Some(user) = msg.from.as_ref() else {
            warn!("Ignoring /start without a sender in chat {}", msg.chat.id);
            return Ok(());
        };
        let user_id = user.id.0 as i64;
        info!("Processing /start from user {} with payload '{}'", user_id, payload);

        let replies = ctx.onboarding.handle_start(user_id, &payload).await?;
        TelegramBot::deliver_replies(&ctx.bot, &ReplyTarget::chat(msg.chat.id), replies).await?;
        Ok(())
    }
}
