use async_trait::async_trait;
use log::{error, info};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, Recipient, UserId};

/// membership of a user in the gated channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MembershipStatus {
    pub fn counts_as_subscribed(&self) -> bool {
        matches!(
            self,
            MembershipStatus::Creator | MembershipStatus::Administrator | MembershipStatus::Member
        )
    }
}

impl From<ChatMemberStatus> for MembershipStatus {
    fn from(status: ChatMemberStatus) -> Self {
        match status {
            ChatMemberStatus::Owner => MembershipStatus::Creator,
            ChatMemberStatus::Administrator => MembershipStatus::Administrator,
            ChatMemberStatus::Member => MembershipStatus::Member,
            ChatMemberStatus::Restricted => MembershipStatus::Restricted,
            ChatMemberStatus::Left => MembershipStatus::Left,
            ChatMemberStatus::Banned => MembershipStatus::Banned,
        }
    }
}

#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn membership_status(
        &self,
        user_id: i64,
    ) -> Result<MembershipStatus, Box<dyn Error + Send + Sync>>;
}

/// asks the Bot API for the user's status in `channel` (an `@username`)
pub struct TelegramMembershipLookup {
    bot: Bot,
    channel: String,
}

impl TelegramMembershipLookup {
    pub fn new(bot: Bot, channel: String) -> Self {
        Self { bot, channel }
    }
}

#[async_trait]
impl MembershipLookup for TelegramMembershipLookup {
    async fn membership_status(
        &self,
        user_id: i64,
    ) -> Result<MembershipStatus, Box<dyn Error + Send + Sync>> {
        let member = self
            .bot
            .get_chat_member(
                Recipient::ChannelUsername(self.channel.clone()),
                UserId(user_id as u64),
            )
            .await?;
        Ok(member.status().into())
    }
}

#[derive(Clone)]
pub struct SubscriptionChecker {
    lookup: Arc<dyn MembershipLookup>,
}

impl SubscriptionChecker {
    pub fn new(lookup: Arc<dyn MembershipLookup>) -> Self {
        Self { lookup }
    }

    /// never fails: lookup errors are logged and count as not subscribed
    pub async fn is_subscribed(&self, user_id: i64) -> bool {
        match self.lookup.membership_status(user_id).await {
            Ok(status) => {
                info!("Membership status for user {}: {:?}", user_id, status);
                status.counts_as_subscribed()
            }
            Err(e) => {
                error!("Failed to check subscription for user {}: {}", user_id, e);
                false
            }
        }
    }
}
