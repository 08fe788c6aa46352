use log::{error, info, warn};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MessageId, ParseMode, ReplyMarkup};
use teloxide::utils::command::BotCommands;

use crate::config::BotConfig;
use crate::handlers::command_handler::parse_start_payload;
use crate::handlers::{CallbackHandler, CommandHandler, MenuHandler};
use crate::onboarding::{Onboarding, Reply};
use crate::subscription::{SubscriptionChecker, TelegramMembershipLookup};
use crate::user_manager::UserStore;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start the bot", parse_with = parse_start_payload)]
    Start(String),
}

#[derive(Clone)]
pub struct BotContext {
    pub bot: Bot,
    pub onboarding: Arc<Onboarding>,
}

/// where the replies of one update go
pub struct ReplyTarget<'a> {
    pub chat_id: ChatId,
    /// message carrying the pressed inline button
    pub prompt: Option<MessageId>,
    /// pressed button, answered exactly once
    pub callback: Option<&'a CallbackQuery>,
}

impl ReplyTarget<'_> {
    pub fn chat(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            prompt: None,
            callback: None,
        }
    }
}

pub struct TelegramBot {
    bot: Bot,
    onboarding: Arc<Onboarding>,
}

impl TelegramBot {
    pub fn new(config: Arc<BotConfig>, store: Arc<dyn UserStore>) -> Self {
        let bot = Bot::new(&config.bot_token);
        let lookup = TelegramMembershipLookup::new(bot.clone(), config.channel_username.clone());
        let checker = SubscriptionChecker::new(Arc::new(lookup));
        let onboarding = Arc::new(Onboarding::new(store, checker, config));

        Self { bot, onboarding }
    }

    pub async fn run(&self) {
        info!("Starting Telegram bot...");

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {}", e);
        }

        let ctx = BotContext {
            bot: self.bot.clone(),
            onboarding: self.onboarding.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint({
                let ctx = ctx.clone();
                move |query: CallbackQuery| {
                    let ctx = ctx.clone();
                    async move { CallbackHandler::handle_callback_query(ctx, query).await }
                }
            }))
            .branch(
                Update::filter_message()
                    .branch(dptree::entry().filter_command::<Command>().endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message, cmd: Command| {
                            let ctx = ctx.clone();
                            async move { CommandHandler::handle_command(ctx, msg, cmd).await }
                        }
                    }))
                    .branch(dptree::endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message| {
                            let ctx = ctx.clone();
                            async move { MenuHandler::handle_message(ctx, msg).await }
                        }
                    })),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .error_handler(
                teloxide::error_handlers::LoggingErrorHandler::with_custom_text(
                    "An error from the update listener",
                ),
            )
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    /// sends the replies produced by the onboarding flow.
    ///
    /// Notifications to other users are best effort; a callback query is answered
    /// exactly once, even when an earlier send or edit fails.
    pub async fn deliver_replies(
        bot: &Bot,
        target: &ReplyTarget<'_>,
        replies: Vec<Reply>,
    ) -> ResponseResult<()> {
        let mut callback_answered = false;
        let delivered = Self::send_replies(bot, target, replies, &mut callback_answered).await;

        if let Some(query) = target.callback {
            if !callback_answered {
                Self::acknowledge_callback(bot, query).await;
            }
        }

        delivered
    }

    /// stops the client-side spinner of a pressed button; failures are only logged
    pub async fn acknowledge_callback(bot: &Bot, query: &CallbackQuery) {
        if let Err(e) = bot.answer_callback_query(&query.id).await {
            warn!("Failed to answer callback query {}: {}", query.id, e);
        }
    }

    async fn send_replies(
        bot: &Bot,
        target: &ReplyTarget<'_>,
        replies: Vec<Reply>,
        callback_answered: &mut bool,
    ) -> ResponseResult<()> {
        for reply in replies {
            match reply {
                Reply::Message { text, html, markup } => {
                    Self::send(bot, target.chat_id, text, html, markup).await?;
                }
                Reply::EditPrompt { text, html, markup } => match target.prompt {
                    Some(message_id) => {
                        let mut request = bot.edit_message_text(target.chat_id, message_id, text);
                        if html {
                            request = request.parse_mode(ParseMode::Html);
                        }
                        if let Some(markup) = markup {
                            request = request.reply_markup(markup);
                        }
                        request.await?;
                    }
                    None => {
                        let markup = markup.map(ReplyMarkup::from);
                        Self::send(bot, target.chat_id, text, html, markup).await?;
                    }
                },
                Reply::Alert(text) => match target.callback {
                    Some(query) if !*callback_answered => {
                        *callback_answered = true;
                        bot.answer_callback_query(&query.id)
                            .text(text)
                            .show_alert(true)
                            .await?;
                    }
                    _ => {
                        Self::send(bot, target.chat_id, text, false, None).await?;
                    }
                },
                Reply::Notify { user_id, text } => {
                    match Self::send(bot, ChatId(user_id), text, true, None).await {
                        Ok(()) => info!("Sent referral notification to user {}", user_id),
                        Err(e) => error!(
                            "Failed to send referral notification to user {}: {}",
                            user_id, e
                        ),
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(
        bot: &Bot,
        chat_id: ChatId,
        text: String,
        html: bool,
        markup: Option<ReplyMarkup>,
    ) -> ResponseResult<()> {
        let mut request = bot.send_message(chat_id, text);
        if html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}
