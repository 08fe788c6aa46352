use log::info;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MaybeInaccessibleMessage, MessageId};

use crate::bot::{BotContext, HandlerResult, ReplyTarget, TelegramBot};
use crate::localization::keyboards::{CHECK_SUBSCRIPTION_CALLBACK, LANG_CALLBACK_PREFIX};

pub struct CallbackHandler;

impl CallbackHandler {
    /// chat of the pressed button and the message to edit, when it is still accessible
    fn prompt_location(message: &MaybeInaccessibleMessage) -> (ChatId, Option<MessageId>) {
        match message {
            MaybeInaccessibleMessage::Regular(msg) => (msg.chat.id, Some(msg.id)),
            MaybeInaccessibleMessage::Inaccessible(msg) => (msg.chat.id, None),
        }
    }

    pub async fn handle_callback_query(ctx: BotContext, query: CallbackQuery) -> HandlerResult {
        let user_id = query.from.id.0 as i64;
        let (chat_id, prompt) = match &query.message {
            Some(message) => Self::prompt_location(message),
            None => (ChatId(user_id), None),
        };

        let outcome = match query.data.as_deref() {
            Some(data) if data.starts_with(LANG_CALLBACK_PREFIX) => {
                let code = &data[LANG_CALLBACK_PREFIX.len()..];
                ctx.onboarding.handle_language(user_id, code).await
            }
            Some(CHECK_SUBSCRIPTION_CALLBACK) => {
                ctx.onboarding.handle_check_subscription(user_id).await
            }
            other => {
                info!("Ignoring callback data {:?} from user {}", other, user_id);
                Ok(Vec::new())
            }
        };
        let replies = match outcome {
            Ok(replies) => replies,
            Err(e) => {
                TelegramBot::acknowledge_callback(&ctx.bot, &query).await;
                return Err(e.into());
            }
        };

        let target = ReplyTarget {
            chat_id,
            prompt,
            callback: Some(&query),
        };
        TelegramBot::deliver_replies(&ctx.bot, &target, replies).await?;
        Ok(())
    }
}
