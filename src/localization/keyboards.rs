use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use url::Url;

use super::Lang;

/// callback data prefix for language buttons, followed by the language code
pub const LANG_CALLBACK_PREFIX: &str = "lang_";
pub const CHECK_SUBSCRIPTION_CALLBACK: &str = "check_sub";

pub fn create_language_keyboard() -> InlineKeyboardMarkup {
    let rows = Lang::ALL
        .iter()
        .map(|lang| {
            vec![InlineKeyboardButton::callback(
                lang.btn_language(),
                format!("{}{}", LANG_CALLBACK_PREFIX, lang.code()),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

pub fn create_subscribe_keyboard(lang: Lang, channel_url: &Url) -> InlineKeyboardMarkup {
    let channel_button = InlineKeyboardButton::url(lang.btn_channel(), channel_url.clone());
    let check_button = InlineKeyboardButton::callback(lang.btn_check(), CHECK_SUBSCRIPTION_CALLBACK);

    InlineKeyboardMarkup::new(vec![vec![channel_button], vec![check_button]])
}

pub fn create_menu_keyboard(lang: Lang) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(lang.btn_balance())],
        vec![KeyboardButton::new(lang.btn_admin())],
    ])
    .resize_keyboard()
}
