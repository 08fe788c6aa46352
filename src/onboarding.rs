//! Onboarding flow: language choice, channel subscription gate, main menu.
//!
//! Every handler reads and writes the [`UserStore`] and returns the replies the
//! transport should deliver, so the flow runs the same against Telegram and in tests.

use log::{info, warn};
use std::sync::Arc;
use teloxide::types::{InlineKeyboardMarkup, ReplyMarkup};

use crate::config::BotConfig;
use crate::localization::keyboards::{
    create_language_keyboard, create_menu_keyboard, create_subscribe_keyboard,
};
use crate::localization::Lang;
use crate::subscription::SubscriptionChecker;
use crate::user_manager::{StoreError, User, UserStore};
use crate::user_session::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// new message in the current chat
    Message {
        text: String,
        html: bool,
        markup: Option<ReplyMarkup>,
    },
    /// rewrites the message whose button was pressed
    EditPrompt {
        text: String,
        html: bool,
        markup: Option<InlineKeyboardMarkup>,
    },
    /// transient alert shown on the pressed button
    Alert(String),
    /// message to another user's private chat
    Notify { user_id: i64, text: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Message { text, .. } | Reply::EditPrompt { text, .. } => text.as_str(),
            Reply::Alert(text) => text.as_str(),
            Reply::Notify { text, .. } => text.as_str(),
        }
    }
}

/// extracts the referrer id from a `/start` payload.
///
/// Only plain digit strings count; a user cannot refer themselves.
pub fn parse_referral_payload(payload: &str, user_id: i64) -> Option<i64> {
    let payload = payload.trim();
    if payload.is_empty() || !payload.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    payload
        .parse::<i64>()
        .ok()
        .filter(|referrer_id| *referrer_id != user_id)
}

pub struct Onboarding {
    store: Arc<dyn UserStore>,
    checker: SubscriptionChecker,
    config: Arc<BotConfig>,
}

impl Onboarding {
    pub fn new(store: Arc<dyn UserStore>, checker: SubscriptionChecker, config: Arc<BotConfig>) -> Self {
        Self {
            store,
            checker,
            config,
        }
    }

    pub async fn handle_start(&self, user_id: i64, payload: &str) -> Result<Vec<Reply>, StoreError> {
        let referred_by = parse_referral_payload(payload, user_id);
        if referred_by.is_none() && !payload.trim().is_empty() {
            info!("Ignoring /start payload '{}' from user {}", payload.trim(), user_id);
        }

        let outcome = self.store.upsert(user_id, None, referred_by).await?;
        let mut replies = Vec::new();

        if outcome.referrer_credited {
            if let Some(referrer_id) = referred_by {
                if let Some(notice) = self.referral_notice(referrer_id).await? {
                    replies.push(notice);
                }
            }
        }

        let user = self.store.get_user(user_id).await?;
        let lang = user.as_ref().and_then(User::lang);

        match (lang, user) {
            (Some(lang), Some(user)) if user.subscribed && user.state.menu_accessible() => {
                info!("User {} restarted with menu access", user_id);
                replies.push(Reply::Message {
                    text: lang.referral_link_message(&self.config.referral_link(user_id)),
                    html: true,
                    markup: Some(create_menu_keyboard(lang).into()),
                });
            }
            (Some(lang), _) => {
                self.store
                    .set_state(user_id, SessionState::CheckingSubscription)
                    .await?;
                replies.push(Reply::Message {
                    text: lang.subscribe_prompt().to_string(),
                    html: false,
                    markup: Some(self.subscribe_keyboard(lang).into()),
                });
            }
            (None, _) => {
                self.store
                    .set_state(user_id, SessionState::ChoosingLanguage)
                    .await?;
                replies.push(Self::language_prompt());
            }
        }

        Ok(replies)
    }

    /// `code` is the part of the callback data after `lang_`
    pub async fn handle_language(&self, user_id: i64, code: &str) -> Result<Vec<Reply>, StoreError> {
        let Some(lang) = Lang::parse(code) else {
            warn!("Ignoring unknown language code '{}' from user {}", code, user_id);
            return Ok(Vec::new());
        };

        self.store.upsert(user_id, Some(lang), None).await?;
        self.store
            .set_state(user_id, SessionState::CheckingSubscription)
            .await?;
        info!("User {} selected language {}", user_id, lang.code());

        Ok(vec![Reply::EditPrompt {
            text: lang.subscribe_prompt().to_string(),
            html: false,
            markup: Some(self.subscribe_keyboard(lang)),
        }])
    }

    pub async fn handle_check_subscription(&self, user_id: i64) -> Result<Vec<Reply>, StoreError> {
        let Some(user) = self.store.get_user(user_id).await? else {
            info!("Subscription check from unknown user {}, restarting onboarding", user_id);
            return Ok(vec![Self::language_prompt_edit()]);
        };
        let Some(lang) = user.lang() else {
            info!("Subscription check from user {} without a language (state: {})", user_id, user.state);
            self.store
                .set_state(user_id, SessionState::ChoosingLanguage)
                .await?;
            return Ok(vec![Self::language_prompt_edit()]);
        };

        if !self.checker.is_subscribed(user_id).await {
            info!("User {} is not subscribed yet (state: {})", user_id, user.state);
            return Ok(vec![Reply::Alert(lang.not_subscribed().to_string())]);
        }

        self.store.set_subscribed(user_id, true).await?;
        self.store.set_state(user_id, SessionState::Active).await?;
        info!("User {} passed the subscription check", user_id);

        Ok(vec![
            Reply::EditPrompt {
                text: lang.referral_link_message(&self.config.referral_link(user_id)),
                html: true,
                markup: None,
            },
            Reply::Message {
                text: lang.main_menu().to_string(),
                html: false,
                markup: Some(create_menu_keyboard(lang).into()),
            },
        ])
    }

    /// menu input; anything outside the active state or not matching a label is ignored
    pub async fn handle_text(&self, user_id: i64, text: &str) -> Result<Vec<Reply>, StoreError> {
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok(Vec::new());
        };
        if !user.state.menu_accessible() {
            return Ok(Vec::new());
        }
        let lang = user.lang().unwrap_or_default();

        let reply = if text.contains(lang.btn_balance()) {
            Some(lang.balance_line(user.balance))
        } else if text.contains(lang.btn_admin()) {
            Some(lang.admin_contact(&self.config.admin_phone, &self.config.admin_username))
        } else {
            None
        };

        Ok(reply
            .map(|text| Reply::Message {
                text,
                html: true,
                markup: None,
            })
            .into_iter()
            .collect())
    }

    async fn referral_notice(&self, referrer_id: i64) -> Result<Option<Reply>, StoreError> {
        let Some(referrer) = self.store.get_user(referrer_id).await? else {
            return Ok(None);
        };
        let lang = referrer.lang().unwrap_or_default();
        Ok(Some(Reply::Notify {
            user_id: referrer_id,
            text: lang.referral_credited(referrer.balance),
        }))
    }

    fn language_prompt() -> Reply {
        Reply::Message {
            text: Lang::default().welcome().to_string(),
            html: false,
            markup: Some(create_language_keyboard().into()),
        }
    }

    /// language choice in place of a stale inline prompt
    fn language_prompt_edit() -> Reply {
        Reply::EditPrompt {
            text: Lang::default().welcome().to_string(),
            html: false,
            markup: Some(create_language_keyboard()),
        }
    }

    fn subscribe_keyboard(&self, lang: Lang) -> InlineKeyboardMarkup {
        create_subscribe_keyboard(lang, &self.config.channel_url)
    }
}
