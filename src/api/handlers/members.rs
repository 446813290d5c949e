use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{age_group, AgeGroup, Member, MemberExportRow},
    error::{AppError, Result},
    storage::DocumentStorage,
    web::receipts::{self, ReceiptKind},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    members: Vec<MemberDto>,
    total: usize,
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    #[serde(flatten)]
    member: Member,
    age: i32,
    age_group: AgeGroup,
    is_minor: bool,
    photo_public_url: Option<String>,
}

impl MemberDto {
    fn new(member: Member, storage: &dyn DocumentStorage) -> Self {
        let age = member.age();
        Self {
            age,
            age_group: age_group(age),
            is_minor: member.is_minor(),
            photo_public_url: storage.resolve(&member.documents.photo),
            member,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    ids: Vec<Uuid>,
}

async fn load_member(state: &AppState, id: Uuid) -> Result<Member> {
    state.service_context.member_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let repo = &state.service_context.member_repo;
    let members = match params.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => repo.search(term).await?,
        _ => repo.list().await?,
    };

    let storage = state.service_context.storage.as_ref();
    let total = members.len();
    let members = members
        .into_iter()
        .map(|m| MemberDto::new(m, storage))
        .collect();

    Ok(Json(ListResponse { members, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = load_member(&state, id).await?;
    Ok(Json(MemberDto::new(member, state.service_context.storage.as_ref())))
}

/// Lookup used by the registration success page.
pub async fn get_by_member_id(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberDto>> {
    let member = state.service_context.member_repo
        .find_by_member_id(&member_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;

    Ok(Json(MemberDto::new(member, state.service_context.storage.as_ref())))
}

/// Rows of the member spreadsheet.
pub async fn export(State(state): State<AppState>) -> Result<Json<Vec<MemberExportRow>>> {
    let members = state.service_context.member_repo.list().await?;
    let today = Local::now().date_naive();

    Ok(Json(
        members.iter().map(|m| MemberExportRow::from_member(m, today)).collect(),
    ))
}

pub async fn receipt(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
) -> Result<Html<String>> {
    let kind = ReceiptKind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown document: {}", kind)))?;
    let member = load_member(&state, id).await?;

    let html = receipts::render(kind, &member, state.service_context.storage.as_ref())?;
    Ok(Html(html))
}

pub async fn bundle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let member = load_member(&state, id).await?;
    let bundle = state.service_context.bundle_service
        .generate_member_zip(&member)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}.zip\"; filename*=UTF-8''{}",
        member.member_id,
        urlencoding::encode(&bundle.file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bundle.bytes,
    )
        .into_response())
}

/// Printable list of the selected members, in the order they were selected.
pub async fn print(
    State(state): State<AppState>,
    Json(request): Json<PrintRequest>,
) -> Result<Html<String>> {
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("No members selected".to_string()));
    }

    let mut members = state.service_context.member_repo
        .find_by_ids(&request.ids)
        .await?;
    members.sort_by_key(|m| request.ids.iter().position(|id| *id == m.id));

    let html = receipts::render_member_list(&members)?;
    Ok(Html(html))
}
