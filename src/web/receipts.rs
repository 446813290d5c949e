use askama::Template;
use chrono::{Local, NaiveDate};

use crate::{
    domain::{
        calculate_age_on, format_date, format_date_numeric, season_label, DocumentKind, Guardian,
        Member, MEMBERSHIP_FEE_LABEL, MEMBERSHIP_FEE_WORDS,
    },
    error::{AppError, Result},
    storage::DocumentStorage,
};

/// Printable documents generated for every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Admin,
    Candidate,
    Card,
    PaymentCertificate,
    CompletionCertificate,
}

impl ReceiptKind {
    pub const ALL: [ReceiptKind; 5] = [
        ReceiptKind::Admin,
        ReceiptKind::Candidate,
        ReceiptKind::Card,
        ReceiptKind::PaymentCertificate,
        ReceiptKind::CompletionCertificate,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReceiptKind::Admin => "admin",
            ReceiptKind::Candidate => "candidate",
            ReceiptKind::Card => "card",
            ReceiptKind::PaymentCertificate => "payment-certificate",
            ReceiptKind::CompletionCertificate => "completion-certificate",
        }
    }

    pub fn parse(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Name of the file inside a member bundle.
    pub fn file_name(&self) -> &'static str {
        match self {
            ReceiptKind::Admin => "admin-receipt.html",
            ReceiptKind::Candidate => "candidate-receipt.html",
            ReceiptKind::Card => "membership-card.html",
            ReceiptKind::PaymentCertificate => "payment-certificate.html",
            ReceiptKind::CompletionCertificate => "completion-certificate.html",
        }
    }
}

pub struct DocumentStatus {
    pub label: &'static str,
    pub attached: bool,
}

/// Member fields as they appear on paper.
pub struct ReceiptView {
    pub member_id: String,
    pub full_name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub age: i32,
    pub gender: &'static str,
    pub phone: String,
    pub education_level: String,
    pub card_number: String,
    pub space: String,
    pub club: String,
    pub activity: String,
    pub registration_date: String,
    pub payment_status: &'static str,
    pub photo_url: Option<String>,
    pub guardian: Option<Guardian>,
    /// Documents this member had to supply.
    pub documents: Vec<DocumentStatus>,
    pub season: String,
    pub fee: &'static str,
    pub fee_words: &'static str,
    pub issued_on: String,
}

impl ReceiptView {
    pub fn new(member: &Member, storage: &dyn DocumentStorage, today: NaiveDate) -> Self {
        let documents = DocumentKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                DocumentKind::ParentalConsent => member.is_minor(),
                DocumentKind::MedicalCertificate => member.requires_medical_certificate(),
                _ => true,
            })
            .map(|kind| DocumentStatus {
                label: kind.arabic_label(),
                attached: member.documents.get(kind).is_available(),
            })
            .collect();

        Self {
            member_id: member.member_id.clone(),
            full_name: member.full_name(),
            birth_date: format_date_numeric(member.birth_date),
            birth_place: format!("{}, {}", member.birth_place_commune, member.birth_place_wilaya),
            age: calculate_age_on(member.birth_date, today),
            gender: member.gender.arabic_label(),
            phone: member.phone.clone(),
            education_level: member.education_level.clone(),
            card_number: member.membership_card_number.clone(),
            space: member.selected_space.clone(),
            club: member.selected_club.clone(),
            activity: member.selected_activity.clone(),
            registration_date: format_date_numeric(
                member.registration_date.with_timezone(&Local).date_naive(),
            ),
            payment_status: if member.payment_confirmed { "مدفوع ✓" } else { "غير مدفوع" },
            photo_url: storage.resolve(&member.documents.photo),
            guardian: member.guardian.clone(),
            documents,
            season: season_label(&member.season),
            fee: MEMBERSHIP_FEE_LABEL,
            fee_words: MEMBERSHIP_FEE_WORDS,
            issued_on: format_date(today),
        }
    }
}

#[derive(Template)]
#[template(path = "receipts/admin_receipt.html")]
struct AdminReceiptTemplate {
    view: ReceiptView,
}

#[derive(Template)]
#[template(path = "receipts/candidate_receipt.html")]
struct CandidateReceiptTemplate {
    view: ReceiptView,
}

#[derive(Template)]
#[template(path = "receipts/membership_card.html")]
struct MembershipCardTemplate {
    view: ReceiptView,
}

#[derive(Template)]
#[template(path = "receipts/payment_certificate.html")]
struct PaymentCertificateTemplate {
    view: ReceiptView,
}

#[derive(Template)]
#[template(path = "receipts/completion_certificate.html")]
struct CompletionCertificateTemplate {
    view: ReceiptView,
}

pub struct MemberListRow {
    pub member_id: String,
    pub full_name: String,
    pub age: i32,
    pub gender: &'static str,
    pub activity: String,
    pub card_number: String,
    pub registration_date: String,
}

#[derive(Template)]
#[template(path = "receipts/member_list.html")]
struct MemberListTemplate {
    printed_on: String,
    rows: Vec<MemberListRow>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn render_admin_receipt(member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    render(ReceiptKind::Admin, member, storage)
}

pub fn render_candidate_receipt(member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    render(ReceiptKind::Candidate, member, storage)
}

pub fn render_membership_card(member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    render(ReceiptKind::Card, member, storage)
}

pub fn render_payment_certificate(member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    render(ReceiptKind::PaymentCertificate, member, storage)
}

pub fn render_completion_certificate(member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    render(ReceiptKind::CompletionCertificate, member, storage)
}

pub fn render(kind: ReceiptKind, member: &Member, storage: &dyn DocumentStorage) -> Result<String> {
    let view = ReceiptView::new(member, storage, today());

    let html = match kind {
        ReceiptKind::Admin => AdminReceiptTemplate { view }.render(),
        ReceiptKind::Candidate => CandidateReceiptTemplate { view }.render(),
        ReceiptKind::Card => MembershipCardTemplate { view }.render(),
        ReceiptKind::PaymentCertificate => PaymentCertificateTemplate { view }.render(),
        ReceiptKind::CompletionCertificate => CompletionCertificateTemplate { view }.render(),
    };

    html.map_err(AppError::from)
}

/// Printable table of the given members, in the given order.
pub fn render_member_list(members: &[Member]) -> Result<String> {
    let today = today();
    let rows = members
        .iter()
        .map(|m| MemberListRow {
            member_id: m.member_id.clone(),
            full_name: m.full_name(),
            age: calculate_age_on(m.birth_date, today),
            gender: m.gender.arabic_label(),
            activity: m.selected_activity.clone(),
            card_number: m.membership_card_number.clone(),
            registration_date: format_date_numeric(m.registration_date.with_timezone(&Local).date_naive()),
        })
        .collect();

    let template = MemberListTemplate {
        printed_on: format_date(today),
        rows,
    };

    Ok(template.render()?)
}
