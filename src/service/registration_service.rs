use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    domain::{
        calculate_age_on, find_activity, Activity, DocumentKind, DocumentRef,
        Gender, Guardian, Member, MemberDocuments, NewMember, RegistrationForm,
        RegistrationRequest, UploadedDocument, MAX_DOCUMENT_SIZE,
    },
    error::{AppError, Result},
    repository::SqliteMemberRepository,
    service::settings_service::SettingsService,
    storage::DocumentStorage,
};

/// Youngest age accepted at registration.
pub const MINIMUM_AGE: i32 = 7;

/// Members younger than this register with a guardian.
pub const ADULT_AGE: i32 = 18;

/// A registration that passed every check and only needs identifiers.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub activity: &'static Activity,
    pub guardian: Option<Guardian>,
}

pub struct RegistrationService {
    pool: SqlitePool,
    storage: Arc<dyn DocumentStorage>,
}

impl RegistrationService {
    pub fn new(pool: SqlitePool, storage: Arc<dyn DocumentStorage>) -> Self {
        Self { pool, storage }
    }

    /// Register a member: allocate ids, store the documents and insert the
    /// row, all inside one transaction. Documents stored before a failed
    /// insert are removed again.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Member> {
        let today = Local::now().date_naive();
        let validated = validate_registration(&request, today)?;
        let form = &request.form;

        let mut tx = self.pool.begin().await?;
        let ids = SettingsService::allocate_identifiers(&mut tx).await?;
        let member_id = ids.member_id;

        let (documents, stored) = self.store_documents(&member_id, &request.documents).await;

        let new_member = NewMember {
            member_id: member_id.clone(),
            season: ids.season,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            birth_date: validated.birth_date,
            birth_place_wilaya: form.birth_place_wilaya.trim().to_string(),
            birth_place_commune: form.birth_place_commune.trim().to_string(),
            phone: form.phone.trim().to_string(),
            gender: validated.gender,
            education_level: form.education_level.trim().to_string(),
            membership_card_number: ids.card_number.to_string(),
            guardian: validated.guardian,
            selected_space: validated.activity.space.to_string(),
            selected_club: validated.activity.club.to_string(),
            selected_activity: validated.activity.name.to_string(),
            payment_confirmed: form.payment_confirmed,
            documents,
        };

        let inserted = match SqliteMemberRepository::insert_with(&mut tx, new_member).await {
            Ok(member) => tx.commit().await.map(|_| member).map_err(AppError::from),
            Err(e) => Err(e),
        };

        match inserted {
            Ok(member) => {
                tracing::info!(
                    "Registered member {} with card {}",
                    member.member_id,
                    member.membership_card_number
                );
                Ok(member)
            }
            Err(e) => {
                tracing::error!("Registration of {} failed: {}", member_id, e);
                self.remove_documents(&stored).await;
                Err(e)
            }
        }
    }

    /// Upload every document under `<dir>/<member_id>.<ext>`. A failed upload
    /// is recorded as a placeholder so the registration still goes through.
    async fn store_documents(
        &self,
        member_id: &str,
        uploads: &[UploadedDocument],
    ) -> (MemberDocuments, Vec<String>) {
        let mut documents = MemberDocuments::default();
        let mut stored = Vec::new();

        for upload in uploads {
            let path = match upload.extension() {
                Some(ext) => format!("{}/{}.{}", upload.kind.storage_dir(), member_id, ext),
                None => format!("{}/{}", upload.kind.storage_dir(), member_id),
            };

            let doc = match self.storage.upload(&path, &upload.data).await {
                Ok(stored_path) => {
                    stored.push(stored_path.clone());
                    DocumentRef::Stored(stored_path)
                }
                Err(e) => {
                    tracing::warn!("Upload of {} failed, keeping a placeholder: {}", path, e);
                    DocumentRef::placeholder_for(&path)
                }
            };

            documents.set(upload.kind, doc);
        }

        (documents, stored)
    }

    async fn remove_documents(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!("Could not remove orphaned document {}: {}", path, e);
            }
        }
    }
}

/// Check a registration against the rules of the form and the activity
/// catalog.
pub fn validate_registration(request: &RegistrationRequest, today: NaiveDate) -> Result<ValidatedRegistration> {
    let form = &request.form;
    form.validate()?;

    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name are required".to_string()));
    }

    let birth_date = NaiveDate::parse_from_str(form.birth_date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Birth date must be formatted YYYY-MM-DD".to_string()))?;
    if birth_date >= today {
        return Err(AppError::Validation("Birth date must be in the past".to_string()));
    }

    let age = calculate_age_on(birth_date, today);
    if age < MINIMUM_AGE {
        return Err(AppError::Validation(format!(
            "Members must be at least {} years old",
            MINIMUM_AGE
        )));
    }

    let gender = Gender::parse(&form.gender)
        .ok_or_else(|| AppError::Validation(format!("Unknown gender: {}", form.gender)))?;

    let activity = find_activity(&form.selected_activity).ok_or_else(|| {
        AppError::Validation(format!("Unknown activity: {}", form.selected_activity))
    })?;

    if !form.payment_confirmed {
        return Err(AppError::Validation("The membership fee must be confirmed".to_string()));
    }

    let is_minor = age < ADULT_AGE;
    let guardian = if is_minor {
        Some(guardian_from_form(form)?)
    } else {
        None
    };

    for kind in DocumentKind::ALL {
        let required = match kind {
            DocumentKind::BirthCertificate | DocumentKind::Photo => true,
            DocumentKind::ParentalConsent => is_minor,
            DocumentKind::MedicalCertificate => activity.requires_medical_certificate,
        };

        match request.document(kind) {
            Some(upload) => check_upload(upload)?,
            None if required => {
                return Err(AppError::Validation(format!(
                    "Missing document: {}",
                    kind.form_field()
                )));
            }
            None => {}
        }
    }

    Ok(ValidatedRegistration {
        birth_date,
        gender,
        activity,
        guardian,
    })
}

fn guardian_from_form(form: &RegistrationForm) -> Result<Guardian> {
    let field = |value: &Option<String>, name: &str| -> Result<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation(format!("{} is required for minors", name)))
    };

    Ok(Guardian {
        first_name: field(&form.guardian_first_name, "guardian_first_name")?,
        last_name: field(&form.guardian_last_name, "guardian_last_name")?,
        national_id: field(&form.guardian_national_id, "guardian_national_id")?,
        phone: field(&form.guardian_phone, "guardian_phone")?,
        relation: field(&form.guardian_relation, "guardian_relation")?,
    })
}

fn check_upload(upload: &UploadedDocument) -> Result<()> {
    if upload.data.is_empty() {
        return Err(AppError::Validation(format!("{} is empty", upload.kind.form_field())));
    }

    if upload.data.len() > MAX_DOCUMENT_SIZE {
        return Err(AppError::Validation(format!(
            "{} is too large (max 10 MB)",
            upload.kind.form_field()
        )));
    }

    let allowed = upload.allowed_extensions();
    match upload.extension() {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::Validation(format!(
            "Invalid file type for {}. Allowed: {}",
            upload.kind.form_field(),
            allowed.join(", ")
        ))),
    }
}
