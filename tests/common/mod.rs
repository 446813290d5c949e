#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use mjbea::{
    config::StorageConfig,
    domain::{DocumentKind, RegistrationForm, RegistrationRequest, UploadedDocument},
    error::{AppError, Result},
    integrations::{DocumentFetcher, FetchedDocument},
    storage::LocalDocumentStorage,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub fn storage_config(root: &Path) -> StorageConfig {
    StorageConfig {
        root: root.to_string_lossy().into_owned(),
        bucket: "documents".to_string(),
        public_base_url: "http://files.test/storage".to_string(),
    }
}

pub fn test_storage(root: &Path) -> LocalDocumentStorage {
    LocalDocumentStorage::new(&storage_config(root))
}

/// Serves canned documents by URL; unknown URLs fail like a 404.
#[derive(Default)]
pub struct FakeFetcher {
    documents: HashMap<String, FetchedDocument>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        self.documents.insert(
            url.to_string(),
            FetchedDocument {
                content_type: content_type.map(str::to_string),
                bytes: bytes.to_vec(),
            },
        );
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        self.requested.lock().unwrap().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::External(format!("{} returned 404 Not Found", url)))
    }
}

pub fn upload(kind: DocumentKind, file_name: &str) -> UploadedDocument {
    UploadedDocument {
        kind,
        file_name: file_name.to_string(),
        data: format!("contents of {}", file_name).into_bytes(),
    }
}

/// A complete adult registration for a non-combat activity.
pub fn adult_registration(first_name: &str) -> RegistrationRequest {
    RegistrationRequest {
        form: RegistrationForm {
            first_name: first_name.to_string(),
            last_name: "بوزيد".to_string(),
            birth_date: "1995-05-20".to_string(),
            birth_place_wilaya: "تبسة".to_string(),
            birth_place_commune: "بئر العاتر".to_string(),
            phone: "0550123456".to_string(),
            gender: "male".to_string(),
            education_level: "جامعي".to_string(),
            selected_activity: "الشطرنج".to_string(),
            payment_confirmed: true,
            ..Default::default()
        },
        documents: vec![
            upload(DocumentKind::BirthCertificate, "acte.pdf"),
            upload(DocumentKind::Photo, "photo.jpg"),
        ],
    }
}

/// A minor registering for judo: guardian, consent and medical certificate.
pub fn minor_judo_registration(first_name: &str) -> RegistrationRequest {
    let mut request = adult_registration(first_name);
    request.form.birth_date = "2012-03-10".to_string();
    request.form.gender = "female".to_string();
    request.form.is_minor = true;
    request.form.selected_activity = "الجيدو".to_string();
    request.form.guardian_first_name = Some("سعيد".to_string());
    request.form.guardian_last_name = Some("بوزيد".to_string());
    request.form.guardian_national_id = Some("109870123456789".to_string());
    request.form.guardian_phone = Some("0661000000".to_string());
    request.form.guardian_relation = Some("الأب".to_string());
    request.documents.push(upload(DocumentKind::ParentalConsent, "consent.png"));
    request.documents.push(upload(DocumentKind::MedicalCertificate, "medical.pdf"));
    request
}
