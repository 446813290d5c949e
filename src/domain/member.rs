use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::age::calculate_age;

/// Prefix of every human-readable member identifier.
pub const MEMBER_ID_PREFIX: &str = "MJBEA";

/// Reserved prefix for documents that were never actually stored.
pub const PLACEHOLDER_PREFIX: &str = "placeholder/";

/// Registration fee shown on every receipt.
pub const MEMBERSHIP_FEE_LABEL: &str = "100 دج";
pub const MEMBERSHIP_FEE_WORDS: &str = "مائة دينار جزائري";

/// `MJBEA` + season + counter padded to five digits.
pub fn generate_member_id(counter: i64, season: &str) -> String {
    format!("{}{}{:05}", MEMBER_ID_PREFIX, season, counter)
}

/// `2425` becomes `2024-2025`; anything else is shown as entered.
pub fn season_label(season: &str) -> String {
    if season.len() == 4 && season.bytes().all(|b| b.is_ascii_digit()) {
        format!("20{}-20{}", &season[..2], &season[2..])
    } else {
        season.to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn arabic_label(&self) -> &'static str {
        match self {
            Gender::Male => "ذكر",
            Gender::Female => "أنثى",
        }
    }
}

/// Legal guardian of a minor member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Guardian {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: String,
    pub relation: String,
}

/// Reference to an uploaded document as stored on the member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum DocumentRef {
    #[default]
    Missing,
    /// The upload failed or was skipped; holds the full `placeholder/...` value.
    Placeholder(String),
    /// Absolute URL, used as is.
    Url(String),
    /// Path relative to the documents bucket.
    Stored(String),
}

impl DocumentRef {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => DocumentRef::Missing,
            Some(s) if s.starts_with(PLACEHOLDER_PREFIX) => DocumentRef::Placeholder(s.to_string()),
            Some(s) if s.starts_with("http") => DocumentRef::Url(s.to_string()),
            Some(s) => DocumentRef::Stored(s.to_string()),
        }
    }

    pub fn placeholder_for(path: &str) -> Self {
        DocumentRef::Placeholder(format!("{}{}", PLACEHOLDER_PREFIX, path))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentRef::Missing => None,
            DocumentRef::Placeholder(s) | DocumentRef::Url(s) | DocumentRef::Stored(s) => Some(s),
        }
    }

    /// True when a real file sits behind the reference.
    pub fn is_available(&self) -> bool {
        matches!(self, DocumentRef::Url(_) | DocumentRef::Stored(_))
    }
}

impl From<Option<String>> for DocumentRef {
    fn from(raw: Option<String>) -> Self {
        DocumentRef::parse(raw.as_deref())
    }
}

impl From<DocumentRef> for Option<String> {
    fn from(doc: DocumentRef) -> Self {
        doc.as_str().map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    BirthCertificate,
    Photo,
    ParentalConsent,
    MedicalCertificate,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::BirthCertificate,
        DocumentKind::Photo,
        DocumentKind::ParentalConsent,
        DocumentKind::MedicalCertificate,
    ];

    /// File name (without extension) inside a member bundle.
    pub fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::BirthCertificate => "birth-certificate",
            DocumentKind::Photo => "photo",
            DocumentKind::ParentalConsent => "parental-consent",
            DocumentKind::MedicalCertificate => "medical-certificate",
        }
    }

    /// Folder inside the documents bucket.
    pub fn storage_dir(&self) -> &'static str {
        match self {
            DocumentKind::BirthCertificate => "birth-certificates",
            DocumentKind::Photo => "photos",
            DocumentKind::ParentalConsent => "parental-consent",
            DocumentKind::MedicalCertificate => "medical-certificates",
        }
    }

    /// Multipart field carrying the upload.
    pub fn form_field(&self) -> &'static str {
        match self {
            DocumentKind::BirthCertificate => "birth_certificate",
            DocumentKind::Photo => "photo",
            DocumentKind::ParentalConsent => "parental_consent",
            DocumentKind::MedicalCertificate => "medical_certificate",
        }
    }

    pub fn from_form_field(name: &str) -> Option<Self> {
        DocumentKind::ALL.into_iter().find(|k| k.form_field() == name)
    }

    pub fn arabic_label(&self) -> &'static str {
        match self {
            DocumentKind::BirthCertificate => "شهادة الميلاد",
            DocumentKind::Photo => "الصورة الشمسية",
            DocumentKind::ParentalConsent => "السماح الأبوي",
            DocumentKind::MedicalCertificate => "الشهادة الطبية",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MemberDocuments {
    pub birth_certificate: DocumentRef,
    pub photo: DocumentRef,
    pub parental_consent: DocumentRef,
    pub medical_certificate: DocumentRef,
}

impl MemberDocuments {
    pub fn get(&self, kind: DocumentKind) -> &DocumentRef {
        match kind {
            DocumentKind::BirthCertificate => &self.birth_certificate,
            DocumentKind::Photo => &self.photo,
            DocumentKind::ParentalConsent => &self.parental_consent,
            DocumentKind::MedicalCertificate => &self.medical_certificate,
        }
    }

    pub fn set(&mut self, kind: DocumentKind, doc: DocumentRef) {
        match kind {
            DocumentKind::BirthCertificate => self.birth_certificate = doc,
            DocumentKind::Photo => self.photo = doc,
            DocumentKind::ParentalConsent => self.parental_consent = doc,
            DocumentKind::MedicalCertificate => self.medical_certificate = doc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: Uuid,
    pub member_id: String,
    /// Season code the member registered in, e.g. `2425`.
    pub season: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub birth_place_wilaya: String,
    pub birth_place_commune: String,
    pub phone: String,
    pub gender: Gender,
    pub education_level: String,
    pub membership_card_number: String,
    /// Present exactly when the member is a minor.
    pub guardian: Option<Guardian>,
    pub selected_space: String,
    pub selected_club: String,
    pub selected_activity: String,
    pub payment_confirmed: bool,
    pub registration_date: DateTime<Utc>,
    pub documents: MemberDocuments,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_minor(&self) -> bool {
        self.guardian.is_some()
    }

    pub fn age(&self) -> i32 {
        calculate_age(self.birth_date)
    }

    pub fn requires_medical_certificate(&self) -> bool {
        super::activity::requires_medical_certificate(&self.selected_activity)
    }
}

/// Everything needed to insert a member row; ids and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub member_id: String,
    pub season: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub birth_place_wilaya: String,
    pub birth_place_commune: String,
    pub phone: String,
    pub gender: Gender,
    pub education_level: String,
    pub membership_card_number: String,
    pub guardian: Option<Guardian>,
    pub selected_space: String,
    pub selected_club: String,
    pub selected_activity: String,
    pub payment_confirmed: bool,
    pub documents: MemberDocuments,
}
