use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub const MEMBER_ID_COUNTER: &str = "member_id_counter";
pub const CURRENT_SEASON: &str = "current_season";
pub const CURRENT_CARD_NUMBER: &str = "current_card_number";
pub const CARD_NUMBER_START: &str = "card_number_start";
pub const CARD_NUMBER_END: &str = "card_number_end";

pub const SETTING_KEYS: [&str; 5] = [
    MEMBER_ID_COUNTER,
    CURRENT_SEASON,
    CURRENT_CARD_NUMBER,
    CARD_NUMBER_START,
    CARD_NUMBER_END,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSetting {
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRangeRequest {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonRequest {
    pub season: String,
}

/// Typed view over the key/value settings table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemSettings {
    pub member_id_counter: i64,
    pub current_season: String,
    pub current_card_number: i64,
    pub card_number_start: i64,
    pub card_number_end: i64,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            member_id_counter: 1,
            current_season: "2425".to_string(),
            current_card_number: 1,
            card_number_start: 1,
            card_number_end: 1000,
        }
    }
}

impl SystemSettings {
    pub fn from_settings(settings: &[SystemSetting]) -> Self {
        let mut config = SystemSettings::default();

        for setting in settings {
            let value = setting.setting_value.trim();
            match setting.setting_key.as_str() {
                MEMBER_ID_COUNTER => {
                    config.member_id_counter = value.parse().unwrap_or(1);
                }
                CURRENT_SEASON => {
                    if !value.is_empty() {
                        config.current_season = value.to_string();
                    }
                }
                CURRENT_CARD_NUMBER => {
                    config.current_card_number = value.parse().unwrap_or(1);
                }
                CARD_NUMBER_START => {
                    config.card_number_start = value.parse().unwrap_or(1);
                }
                CARD_NUMBER_END => {
                    config.card_number_end = value.parse().unwrap_or(1000);
                }
                _ => {}
            }
        }

        config
    }

    /// Card numbers still available in the configured range.
    pub fn remaining_cards(&self) -> i64 {
        (self.card_number_end - self.current_card_number + 1).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str) -> SystemSetting {
        SystemSetting {
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_or_bad_values_use_defaults() {
        let parsed = SystemSettings::from_settings(&[
            setting(MEMBER_ID_COUNTER, "abc"),
            setting(CURRENT_SEASON, ""),
            setting(CARD_NUMBER_END, "500"),
        ]);
        assert_eq!(parsed.member_id_counter, 1);
        assert_eq!(parsed.current_season, "2425");
        assert_eq!(parsed.card_number_end, 500);
        assert_eq!(parsed.current_card_number, 1);
    }

    #[test]
    fn remaining_cards_never_negative() {
        let mut settings = SystemSettings::default();
        settings.current_card_number = 998;
        assert_eq!(settings.remaining_cards(), 3);
        settings.current_card_number = 2000;
        assert_eq!(settings.remaining_cards(), 0);
    }
}
