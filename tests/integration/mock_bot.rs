use std::sync::{Arc, Mutex};

use referral_bot::onboarding::{Onboarding, Reply};
use referral_bot::user_manager::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKind {
    Message,
    Edit,
    Alert,
}

/// represents a delivered reply for verification in tests
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub kind: SentKind,
    pub html: bool,
    pub has_keyboard: bool,
}

/// mock telegram bot that routes updates into the onboarding flow without real API calls
#[derive(Debug, Clone, Default)]
pub struct MockTelegramBot {
    pub sent_messages: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockTelegramBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// records replies the way the real bot would deliver them for `chat_id`
    pub fn deliver(&self, chat_id: i64, replies: &[Reply]) {
        let mut sent = self.sent_messages.lock().unwrap();
        for reply in replies {
            let message = match reply {
                Reply::Message { text, html, markup } => SentMessage {
                    chat_id,
                    text: text.clone(),
                    kind: SentKind::Message,
                    html: *html,
                    has_keyboard: markup.is_some(),
                },
                Reply::EditPrompt { text, html, markup } => SentMessage {
                    chat_id,
                    text: text.clone(),
                    kind: SentKind::Edit,
                    html: *html,
                    has_keyboard: markup.is_some(),
                },
                Reply::Alert(text) => SentMessage {
                    chat_id,
                    text: text.clone(),
                    kind: SentKind::Alert,
                    html: false,
                    has_keyboard: false,
                },
                Reply::Notify { user_id, text } => SentMessage {
                    chat_id: *user_id,
                    text: text.clone(),
                    kind: SentKind::Message,
                    html: true,
                    has_keyboard: false,
                },
            };
            sent.push(message);
        }
    }

    pub fn get_sent_messages(&self) -> Vec<SentMessage> {
        self.sent_messages.lock().unwrap().clone()
    }

    pub fn get_messages_for_chat(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent_messages
            .lock()
            .unwrap()
            .iter()
            .filter(|msg| msg.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn clear_messages(&self) {
        self.sent_messages.lock().unwrap().clear();
    }

    pub fn message_count_for_chat(&self, chat_id: i64) -> usize {
        self.get_messages_for_chat(chat_id).len()
    }

    pub fn chat_received_message_containing(&self, chat_id: i64, text: &str) -> bool {
        self.get_messages_for_chat(chat_id)
            .iter()
            .any(|msg| msg.text.contains(text))
    }

    pub fn last_for_chat(&self, chat_id: i64) -> Option<SentMessage> {
        self.get_messages_for_chat(chat_id).pop()
    }

    /// simulates `/start <payload>` in the user's private chat
    pub async fn simulate_start(
        &self,
        onboarding: &Onboarding,
        user_id: i64,
        payload: &str,
    ) -> Result<Vec<Reply>, StoreError> {
        let replies = onboarding.handle_start(user_id, payload).await?;
        self.deliver(user_id, &replies);
        Ok(replies)
    }

    /// simulates pressing a `lang_<code>` button
    pub async fn simulate_language(
        &self,
        onboarding: &Onboarding,
        user_id: i64,
        code: &str,
    ) -> Result<Vec<Reply>, StoreError> {
        let replies = onboarding.handle_language(user_id, code).await?;
        self.deliver(user_id, &replies);
        Ok(replies)
    }

    /// simulates pressing the subscription check button
    pub async fn simulate_check(
        &self,
        onboarding: &Onboarding,
        user_id: i64,
    ) -> Result<Vec<Reply>, StoreError> {
        let replies = onboarding.handle_check_subscription(user_id).await?;
        self.deliver(user_id, &replies);
        Ok(replies)
    }

    /// simulates typing free text (or tapping a menu button)
    pub async fn simulate_text(
        &self,
        onboarding: &Onboarding,
        user_id: i64,
        text: &str,
    ) -> Result<Vec<Reply>, StoreError> {
        let replies = onboarding.handle_text(user_id, text).await?;
        self.deliver(user_id, &replies);
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_bot_routes_replies() {
        let bot = MockTelegramBot::new();

        bot.deliver(
            123,
            &[
                Reply::Message {
                    text: "Hello".to_string(),
                    html: false,
                    markup: None,
                },
                Reply::Alert("Careful".to_string()),
                Reply::Notify {
                    user_id: 456,
                    text: "World".to_string(),
                },
            ],
        );

        let messages = bot.get_sent_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].chat_id, 123);
        assert_eq!(messages[1].kind, SentKind::Alert);
        assert_eq!(messages[2].chat_id, 456);
        assert!(messages[2].html);

        assert_eq!(bot.message_count_for_chat(123), 2);
        assert!(bot.chat_received_message_containing(456, "World"));
        assert!(!bot.chat_received_message_containing(123, "World"));

        bot.clear_messages();
        assert!(bot.get_sent_messages().is_empty());
    }
}
