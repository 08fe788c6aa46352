use std::fmt;

/// position of a user in the onboarding flow, persisted in `users.state`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// no record or no language yet
    #[default]
    New,
    ChoosingLanguage,
    CheckingSubscription,
    /// passed the subscription gate, menu is available
    Active,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::New => "new",
            SessionState::ChoosingLanguage => "choosing_language",
            SessionState::CheckingSubscription => "checking_subscription",
            SessionState::Active => "active",
        }
    }

    /// unknown values read as `New` so a bad row restarts onboarding
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("choosing_language") => SessionState::ChoosingLanguage,
            Some("checking_subscription") => SessionState::CheckingSubscription,
            Some("active") => SessionState::Active,
            _ => SessionState::New,
        }
    }

    pub fn menu_accessible(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
