use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::state::AppState,
    domain::{DocumentKind, Member, RegistrationForm, RegistrationRequest, UploadedDocument},
    error::{AppError, Result},
};

fn is_checked(value: &str) -> bool {
    matches!(value.trim(), "true" | "on" | "1" | "yes")
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Read the registration form and its files from a multipart body.
async fn read_request(mut multipart: Multipart) -> Result<RegistrationRequest> {
    let mut form = RegistrationForm::default();
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Some(kind) = DocumentKind::from_form_field(&name) {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))?;

            // Browsers send an empty part for untouched file inputs
            if !file_name.is_empty() && !data.is_empty() {
                documents.push(UploadedDocument {
                    kind,
                    file_name,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))?;

        match name.as_str() {
            "first_name" => form.first_name = value,
            "last_name" => form.last_name = value,
            "birth_date" => form.birth_date = value,
            "birth_place_wilaya" => form.birth_place_wilaya = value,
            "birth_place_commune" => form.birth_place_commune = value,
            "phone" => form.phone = value,
            "gender" => form.gender = value,
            "education_level" => form.education_level = value,
            "is_minor" => form.is_minor = is_checked(&value),
            "guardian_first_name" => form.guardian_first_name = optional(value),
            "guardian_last_name" => form.guardian_last_name = optional(value),
            "guardian_national_id" => form.guardian_national_id = optional(value),
            "guardian_phone" => form.guardian_phone = optional(value),
            "guardian_relation" => form.guardian_relation = optional(value),
            "selected_activity" => form.selected_activity = value,
            "payment_confirmed" => form.payment_confirmed = is_checked(&value),
            _ => {}
        }
    }

    Ok(RegistrationRequest { form, documents })
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Member>)> {
    let request = read_request(multipart).await?;
    let member = state.service_context.registration_service
        .register(request)
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}
