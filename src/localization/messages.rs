/// supported languages for the bot UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lang {
    #[default]
    Uz,
    Ru,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::Uz, Lang::Ru];

    /// parses a stored or callback language code ("uz", "ru"); anything else is none
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "uz" => Some(Lang::Uz),
            "ru" => Some(Lang::Ru),
            _ => None,
        }
    }

    /// resolves an optional code, falling back to the default language
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(Self::parse).unwrap_or_default()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Lang::Uz => "uz",
            Lang::Ru => "ru",
        }
    }
}

/// looks up a localized string by key.
///
/// Unset or unknown language codes use the default table; unknown keys yield "".
pub fn get_text(key: &str, lang: Option<&str>) -> &'static str {
    let lang = Lang::from_code(lang);
    match key {
        "welcome" => lang.welcome(),
        "subscribe_prompt" => lang.subscribe_prompt(),
        "channel_button" => lang.btn_channel(),
        "check_button" => lang.btn_check(),
        "not_subscribed" => lang.not_subscribed(),
        "subscribed" => lang.subscribed(),
        "balance" => lang.btn_balance(),
        "admin" => lang.btn_admin(),
        "main_menu" => lang.main_menu(),
        "admin_contact" => lang.admin_contact_title(),
        "referral_credited" => lang.referral_credited_title(),
        _ => "",
    }
}

// =============================================================================
// Onboarding
// =============================================================================

impl Lang {
    pub fn welcome(&self) -> &'static str {
        match self {
            Lang::Uz => "🇺🇿 Xush kelibsiz! Tilni tanlang:",
            Lang::Ru => "🇷🇺 Добро пожаловать! Выберите язык:",
        }
    }

    pub fn subscribe_prompt(&self) -> &'static str {
        match self {
            Lang::Uz => "🔥 Botdan foydalanish uchun quyidagi kanalga obuna bo'ling:",
            Lang::Ru => "🔥 Чтобы использовать бота, подпишитесь на канал:",
        }
    }

    pub fn not_subscribed(&self) -> &'static str {
        match self {
            Lang::Uz => "❌ Siz hali obuna bo'lmagansiz!\nObuna bo'lib, qayta tekshiring.",
            Lang::Ru => "❌ Вы еще не подписаны!\nПодпишитесь и проверьте снова.",
        }
    }

    pub fn subscribed(&self) -> &'static str {
        match self {
            Lang::Uz => "🎉 Tabriklaymiz! Siz muvaffaqiyatli obuna bo'ldingiz.\n\nSizning shaxsiy referral linkingiz:\n",
            Lang::Ru => "🎉 Поздравляем! Вы успешно подписались.\n\nВаша личная реферальная ссылка:\n",
        }
    }

    pub fn main_menu(&self) -> &'static str {
        match self {
            Lang::Uz => "🏠 Asosiy menu:",
            Lang::Ru => "🏠 Главное меню:",
        }
    }

    /// subscription confirmation followed by the referral link in a code block
    pub fn referral_link_message(&self, referral_link: &str) -> String {
        format!(
            "{}<code>{}</code>",
            self.subscribed(),
            html_escape::encode_text(referral_link)
        )
    }
}

// =============================================================================
// Menu
// =============================================================================

impl Lang {
    pub fn balance_line(&self, balance: i32) -> String {
        format!("{}: <b>{}</b>", self.btn_balance(), balance)
    }

    pub fn admin_contact_title(&self) -> &'static str {
        match self {
            Lang::Uz => "📞 Admin bilan bog‘lanish:",
            Lang::Ru => "📞 Связь с администратором:",
        }
    }

    pub fn admin_contact(&self, phone: &str, username: &str) -> String {
        let (phone_label, telegram_label) = match self {
            Lang::Uz => ("Raqam", "Telegram"),
            Lang::Ru => ("Номер", "Telegram"),
        };
        format!(
            "{}\n{phone_label}: {}\n{telegram_label}: {}",
            self.admin_contact_title(),
            html_escape::encode_text(phone),
            html_escape::encode_text(username)
        )
    }
}

// =============================================================================
// Referrals
// =============================================================================

impl Lang {
    pub fn referral_credited_title(&self) -> &'static str {
        match self {
            Lang::Uz => "🎁 Sizning havolangiz orqali yangi foydalanuvchi qo'shildi!",
            Lang::Ru => "🎁 По вашей ссылке присоединился новый пользователь!",
        }
    }

    pub fn referral_credited(&self, balance: i32) -> String {
        format!("{}\n\n{}", self.referral_credited_title(), self.balance_line(balance))
    }
}

// =============================================================================
// Buttons
// =============================================================================

impl Lang {
    pub fn btn_language(&self) -> &'static str {
        match self {
            Lang::Uz => "🇺🇿 O'zbekcha",
            Lang::Ru => "🇷🇺 Русский",
        }
    }

    pub fn btn_channel(&self) -> &'static str {
        match self {
            Lang::Uz => "📢 Kanalga o'tish",
            Lang::Ru => "📢 Перейти в канал",
        }
    }

    pub fn btn_check(&self) -> &'static str {
        match self {
            Lang::Uz => "✅ Tekshirish",
            Lang::Ru => "✅ Проверить",
        }
    }

    pub fn btn_balance(&self) -> &'static str {
        match self {
            Lang::Uz => "👤 Ballarim",
            Lang::Ru => "👤 Мои баллы",
        }
    }

    pub fn btn_admin(&self) -> &'static str {
        match self {
            Lang::Uz => "📞 Admin",
            Lang::Ru => "📞 Админ",
        }
    }
}
