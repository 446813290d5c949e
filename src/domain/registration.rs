use serde::Deserialize;
use validator::Validate;

use super::member::DocumentKind;

/// Maximum size of one uploaded document (10 MB)
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Extensions accepted for scanned documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Extensions accepted for the member photo
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Text part of a registration, as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    /// `YYYY-MM-DD`
    #[validate(length(min = 1, message = "birth date is required"))]
    pub birth_date: String,
    #[validate(length(max = 100))]
    pub birth_place_wilaya: String,
    #[validate(length(max = 100))]
    pub birth_place_commune: String,
    #[validate(length(min = 9, max = 20, message = "phone number is invalid"))]
    pub phone: String,
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[validate(length(max = 100))]
    pub education_level: String,
    #[serde(default)]
    pub is_minor: bool,
    #[validate(length(max = 100))]
    pub guardian_first_name: Option<String>,
    #[validate(length(max = 100))]
    pub guardian_last_name: Option<String>,
    #[validate(length(max = 30))]
    pub guardian_national_id: Option<String>,
    #[validate(length(max = 20))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 50))]
    pub guardian_relation: Option<String>,
    #[validate(length(min = 1, message = "activity is required"))]
    pub selected_activity: String,
    #[serde(default)]
    pub payment_confirmed: bool,
}

/// A file received with the registration.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub kind: DocumentKind,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadedDocument {
    /// Lower-cased extension of the original file name.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self.kind {
            DocumentKind::Photo => PHOTO_EXTENSIONS,
            _ => DOCUMENT_EXTENSIONS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub form: RegistrationForm,
    pub documents: Vec<UploadedDocument>,
}

impl RegistrationRequest {
    pub fn document(&self, kind: DocumentKind) -> Option<&UploadedDocument> {
        self.documents.iter().find(|d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(kind: DocumentKind, name: &str) -> UploadedDocument {
        UploadedDocument {
            kind,
            file_name: name.to_string(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(upload(DocumentKind::Photo, "Me.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(upload(DocumentKind::Photo, "scan.tar.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(upload(DocumentKind::Photo, "noext").extension(), None);
        assert_eq!(upload(DocumentKind::Photo, ".hidden").extension(), None);
    }

    #[test]
    fn photos_accept_images_only() {
        assert!(!upload(DocumentKind::Photo, "a.pdf").allowed_extensions().contains(&"pdf"));
        assert!(upload(DocumentKind::MedicalCertificate, "a.pdf").allowed_extensions().contains(&"pdf"));
    }

    #[test]
    fn form_validation_reports_missing_names() {
        let form = RegistrationForm {
            phone: "0550123456".to_string(),
            birth_date: "2001-02-03".to_string(),
            gender: "male".to_string(),
            selected_activity: "الجيدو".to_string(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));
        assert!(!fields.contains_key("phone"));
    }
}
