use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::age::{calculate_age_on, format_date_numeric};
use super::member::Member;

/// One row of the member list export, column for column.
#[derive(Debug, Clone, Serialize)]
pub struct MemberExportRow {
    pub member_id: String,
    pub full_name: String,
    pub birth_date: String,
    pub age: i32,
    pub gender: &'static str,
    pub birth_place_wilaya: String,
    pub birth_place_commune: String,
    pub phone: String,
    pub education_level: String,
    pub membership_card_number: String,
    pub space: String,
    pub club: String,
    pub activity: String,
    pub registration_date: String,
    pub payment_status: &'static str,
    pub minor: &'static str,
}

impl MemberExportRow {
    pub fn from_member(member: &Member, today: NaiveDate) -> Self {
        Self {
            member_id: member.member_id.clone(),
            full_name: member.full_name(),
            birth_date: format_date_numeric(member.birth_date),
            age: calculate_age_on(member.birth_date, today),
            gender: member.gender.arabic_label(),
            birth_place_wilaya: member.birth_place_wilaya.clone(),
            birth_place_commune: member.birth_place_commune.clone(),
            phone: member.phone.clone(),
            education_level: member.education_level.clone(),
            membership_card_number: member.membership_card_number.clone(),
            space: member.selected_space.clone(),
            club: member.selected_club.clone(),
            activity: member.selected_activity.clone(),
            registration_date: format_date_numeric(
                member.registration_date.with_timezone(&Local).date_naive(),
            ),
            payment_status: if member.payment_confirmed { "مدفوع" } else { "غير مدفوع" },
            minor: if member.is_minor() { "نعم" } else { "لا" },
        }
    }
}
