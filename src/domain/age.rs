use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month names as written in Algeria (ar-DZ).
const ARABIC_MONTHS: [&str; 12] = [
    "جانفي", "فيفري", "مارس", "أفريل", "ماي", "جوان",
    "جويلية", "أوت", "سبتمبر", "أكتوبر", "نوفمبر", "ديسمبر",
];

/// Age in whole years as of the local calendar date.
pub fn calculate_age(birth_date: NaiveDate) -> i32 {
    calculate_age_on(birth_date, Local::now().date_naive())
}

pub fn calculate_age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Demographic reporting bucket.
///
/// Serialized with the bucket label (`"7-14"`, ...), which is also the
/// key used in statistics maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "7-14")]
    Children,
    #[serde(rename = "15-18")]
    Adolescents,
    #[serde(rename = "19-35")]
    Youth,
    #[serde(rename = "35+")]
    Adults,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Children,
        AgeGroup::Adolescents,
        AgeGroup::Youth,
        AgeGroup::Adults,
    ];

    /// Ages under 7 have no bucket of their own and land in `35+`.
    pub fn from_age(age: i32) -> Self {
        match age {
            7..=14 => AgeGroup::Children,
            15..=18 => AgeGroup::Adolescents,
            19..=35 => AgeGroup::Youth,
            _ => AgeGroup::Adults,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Children => "7-14",
            AgeGroup::Adolescents => "15-18",
            AgeGroup::Youth => "19-35",
            AgeGroup::Adults => "35+",
        }
    }

    pub fn arabic_label(&self) -> &'static str {
        match self {
            AgeGroup::Children => "من 7 إلى 14 سنة",
            AgeGroup::Adolescents => "من 15 إلى 18 سنة",
            AgeGroup::Youth => "من 19 إلى 35 سنة",
            AgeGroup::Adults => "من 35 سنة فما فوق",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn age_group(age: i32) -> AgeGroup {
    AgeGroup::from_age(age)
}

/// Long form, e.g. `15 جانفي 2024`.
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), ARABIC_MONTHS[date.month0() as usize], date.year())
}

/// Short numeric form, e.g. `15/1/2024`.
pub fn format_date_numeric(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}
