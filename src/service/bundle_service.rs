use std::io::{Cursor, Write};
use std::sync::Arc;

use futures_util::future::join_all;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::{
    domain::{DocumentKind, Member},
    error::{AppError, Result},
    integrations::DocumentFetcher,
    storage::DocumentStorage,
    web::receipts::{self, ReceiptKind},
};

/// Zip archive of everything on file for one member.
#[derive(Debug, Clone)]
pub struct MemberBundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct BundleService {
    storage: Arc<dyn DocumentStorage>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl BundleService {
    pub fn new(storage: Arc<dyn DocumentStorage>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { storage, fetcher }
    }

    /// Build `<member_id>-<first>-<last>.zip` with the five printable
    /// documents under `receipts/` and whichever uploaded documents could be
    /// fetched under `documents/`.
    pub async fn generate_member_zip(&self, member: &Member) -> Result<MemberBundle> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(9);

        for kind in ReceiptKind::ALL {
            let html = receipts::render(kind, member, self.storage.as_ref())?;
            entries.push((format!("receipts/{}", kind.file_name()), html.into_bytes()));
        }

        let fetches = DocumentKind::ALL
            .into_iter()
            .map(|kind| self.fetch_document(member, kind));
        entries.extend(join_all(fetches).await.into_iter().flatten());

        let bytes = write_archive(&entries)?;
        tracing::debug!(
            "Built bundle for {} with {} entries ({} bytes)",
            member.member_id,
            entries.len(),
            bytes.len()
        );

        Ok(MemberBundle {
            file_name: bundle_file_name(member),
            bytes,
        })
    }

    async fn fetch_document(&self, member: &Member, kind: DocumentKind) -> Option<(String, Vec<u8>)> {
        let doc = member.documents.get(kind);
        let url = self.storage.resolve(doc)?;

        match self.fetcher.fetch(&url).await {
            Ok(fetched) => {
                let ext = document_extension(doc.as_str().unwrap_or_default(), fetched.content_type.as_deref());
                Some((format!("documents/{}{}", kind.file_stem(), ext), fetched.bytes))
            }
            Err(e) => {
                tracing::warn!(
                    "Skipping {} of {} in bundle ({}): {}",
                    kind.file_stem(),
                    member.member_id,
                    self.fetcher.name(),
                    e
                );
                None
            }
        }
    }
}

pub fn bundle_file_name(member: &Member) -> String {
    format!("{}-{}-{}.zip", member.member_id, member.first_name, member.last_name)
}

/// Extension (with the dot) for a bundled document: taken from the stored
/// reference when it has one, else from the response media type.
pub fn document_extension(reference: &str, content_type: Option<&str>) -> String {
    let path = reference.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();

    if let Some((_, ext)) = segment.rsplit_once('.') {
        if !ext.is_empty() {
            return format!(".{}", ext);
        }
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("image/jpeg") | Some("image/jpg") => ".jpg",
        Some("image/png") => ".png",
        Some("application/pdf") => ".pdf",
        _ => ".bin",
    }
    .to_string()
}

fn write_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, data) in entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)
                .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", name, e)))?;
        }

        zip.finish()?;
    }

    Ok(buf.into_inner())
}
