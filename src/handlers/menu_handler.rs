use teloxide::prelude::*;

use crate::bot::{BotContext, HandlerResult, ReplyTarget, TelegramBot};

pub struct MenuHandler;

impl MenuHandler {
    pub async fn handle_message(ctx: BotContext, msg: Message) -> HandlerResult {
        let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
            return Ok(());
        };

        let replies = ctx
            .onboarding
            .handle_text(user.id.0 as i64, text.trim())
            .await?;
        TelegramBot::deliver_replies(&ctx.bot, &ReplyTarget::chat(msg.chat.id), replies).await?;
        Ok(())
    }
}
