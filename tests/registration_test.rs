mod common;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use mjbea::{
    domain::{CardRangeRequest, DocumentRef, NewMember, SeasonRequest, UpdateSettingRequest},
    error::{AppError, Result},
    repository::{MemberRepository, SqliteMemberRepository},
    service::{registration_service::RegistrationService, settings_service::SettingsService},
    storage::DocumentStorage,
};

/// Storage whose uploads always fail.
struct UnavailableStorage;

#[async_trait]
impl DocumentStorage for UnavailableStorage {
    async fn upload(&self, path: &str, _data: &[u8]) -> Result<String> {
        Err(AppError::Storage(format!("bucket offline while writing {}", path)))
    }

    async fn delete(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://offline.test/{}", path)
    }
}

#[tokio::test]
async fn test_registration_allocates_sequential_identifiers() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));

    let first = service.register(common::adult_registration("أمين")).await?;
    let second = service.register(common::minor_judo_registration("سارة")).await?;

    assert_eq!(first.member_id, "MJBEA242500001");
    assert_eq!(first.membership_card_number, "1");
    assert_eq!(second.member_id, "MJBEA242500002");
    assert_eq!(second.membership_card_number, "2");

    // Club and space come from the catalog
    assert_eq!(second.selected_club, "نادي الرياضات القتالية");
    assert_eq!(second.selected_space, "الفضاء الرياضي");
    assert!(second.is_minor());
    assert!(first.guardian.is_none());

    // Documents are stored under <dir>/<member_id>.<ext>
    assert_eq!(
        first.documents.photo,
        DocumentRef::Stored("photos/MJBEA242500001.jpg".to_string())
    );
    assert_eq!(
        second.documents.medical_certificate,
        DocumentRef::Stored("medical-certificates/MJBEA242500002.pdf".to_string())
    );
    assert!(dir.path().join("documents/photos/MJBEA242500001.jpg").exists());
    assert!(dir.path().join("documents/parental-consent/MJBEA242500002.png").exists());

    let settings = SettingsService::new(pool).get_system_settings().await?;
    assert_eq!(settings.member_id_counter, 3);
    assert_eq!(settings.current_card_number, 3);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_identifiers() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = Arc::new(RegistrationService::new(
        pool.clone(),
        Arc::new(common::test_storage(dir.path())),
    ));

    let attempts = (0..6).map(|i| {
        let service = service.clone();
        async move { service.register(common::adult_registration(&format!("عضو{}", i))).await }
    });

    let mut member_ids = Vec::new();
    let mut cards = Vec::new();
    for result in join_all(attempts).await {
        let member = result?;
        member_ids.push(member.member_id);
        cards.push(member.membership_card_number);
    }

    member_ids.sort();
    member_ids.dedup();
    cards.sort();
    cards.dedup();
    assert_eq!(member_ids.len(), 6);
    assert_eq!(cards.len(), 6);

    let repo = SqliteMemberRepository::new(pool);
    assert_eq!(repo.count().await?, 6);

    Ok(())
}

#[tokio::test]
async fn test_exhausted_card_range_is_conflict_and_rolls_back() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));
    let settings = SettingsService::new(pool.clone());

    settings.update_card_range(CardRangeRequest { start: 500, end: 500 }).await?;

    let member = service.register(common::adult_registration("أمين")).await?;
    assert_eq!(member.membership_card_number, "500");

    let refused = service.register(common::adult_registration("سارة")).await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));

    // Nothing was inserted and the member counter did not move
    let repo = SqliteMemberRepository::new(pool);
    assert_eq!(repo.count().await?, 1);
    let current = settings.get_system_settings().await?;
    assert_eq!(current.member_id_counter, 2);
    assert_eq!(current.current_card_number, 501);
    assert_eq!(current.remaining_cards(), 0);

    Ok(())
}

#[tokio::test]
async fn test_failed_uploads_become_placeholders() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let service = RegistrationService::new(pool, Arc::new(UnavailableStorage));

    let member = service.register(common::adult_registration("أمين")).await?;

    assert_eq!(
        member.documents.photo,
        DocumentRef::Placeholder("placeholder/photos/MJBEA242500001.jpg".to_string())
    );
    assert_eq!(
        member.documents.birth_certificate,
        DocumentRef::Placeholder("placeholder/birth-certificates/MJBEA242500001.pdf".to_string())
    );
    assert_eq!(member.documents.parental_consent, DocumentRef::Missing);

    Ok(())
}

#[tokio::test]
async fn test_failed_insert_removes_stored_documents() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));

    // Make every insert into members fail after the documents are stored
    sqlx::query(
        "CREATE TRIGGER reject_members BEFORE INSERT ON members BEGIN SELECT RAISE(ABORT, 'members closed'); END",
    )
    .execute(&pool)
    .await?;

    let result = service.register(common::adult_registration("أمين")).await;
    assert!(matches!(result, Err(AppError::Database(_))));

    assert!(!dir.path().join("documents/photos/MJBEA242500001.jpg").exists());
    assert!(!dir.path().join("documents/birth-certificates/MJBEA242500001.pdf").exists());

    let settings = SettingsService::new(pool.clone()).get_system_settings().await?;
    assert_eq!(settings.member_id_counter, 1);
    assert_eq!(settings.current_card_number, 1);
    assert_eq!(SqliteMemberRepository::new(pool).count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_taken_member_ids_are_skipped() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));
    let repo = SqliteMemberRepository::new(pool.clone());

    // A row already holds the member id the counter points at
    let existing = NewMember {
        member_id: "MJBEA242500001".to_string(),
        season: "2425".to_string(),
        first_name: "قديم".to_string(),
        last_name: "عضو".to_string(),
        birth_date: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        birth_place_wilaya: String::new(),
        birth_place_commune: String::new(),
        phone: "0550000000".to_string(),
        gender: mjbea::domain::Gender::Female,
        education_level: String::new(),
        membership_card_number: "0".to_string(),
        guardian: None,
        selected_space: "الفضاء الثقافي".to_string(),
        selected_club: "نادي المسرح".to_string(),
        selected_activity: "المسرح".to_string(),
        payment_confirmed: true,
        documents: Default::default(),
    };
    repo.create(existing).await?;

    let member = service.register(common::adult_registration("أمين")).await?;
    assert_eq!(member.member_id, "MJBEA242500002");
    assert_eq!(member.membership_card_number, "1");
    assert!(dir.path().join("documents/photos/MJBEA242500002.jpg").exists());

    let settings = SettingsService::new(pool).get_system_settings().await?;
    assert_eq!(settings.member_id_counter, 3);
    assert_eq!(repo.count().await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_registrations_continue_after_counter_reset() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));
    let settings = SettingsService::new(pool.clone());

    let first = service.register(common::adult_registration("أمين")).await?;
    assert_eq!(first.member_id, "MJBEA242500001");

    settings.reset_member_id_counter().await?;

    let mut member_ids = Vec::new();
    for name in ["سارة", "ليلى", "يوسف"] {
        member_ids.push(service.register(common::adult_registration(name)).await?.member_id);
    }
    assert_eq!(member_ids, vec!["MJBEA242500002", "MJBEA242500003", "MJBEA242500004"]);

    // Setting the counter onto a taken id behaves the same way
    settings
        .update_setting("member_id_counter", UpdateSettingRequest { value: "3".to_string() })
        .await?;
    let next = service.register(common::adult_registration("مريم")).await?;
    assert_eq!(next.member_id, "MJBEA242500005");

    let current = settings.get_system_settings().await?;
    assert_eq!(current.member_id_counter, 6);
    assert_eq!(SqliteMemberRepository::new(pool).count().await?, 5);

    Ok(())
}

#[tokio::test]
async fn test_invalid_registration_allocates_nothing() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));

    let mut request = common::minor_judo_registration("سارة");
    request.documents.retain(|d| d.kind != mjbea::domain::DocumentKind::MedicalCertificate);

    let result = service.register(request).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let settings = SettingsService::new(pool).get_system_settings().await?;
    assert_eq!(settings.member_id_counter, 1);

    Ok(())
}

#[tokio::test]
async fn test_bulk_delete_resets_counters() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool.clone(), Arc::new(common::test_storage(dir.path())));
    let settings = SettingsService::new(pool.clone());

    settings.update_card_range(CardRangeRequest { start: 100, end: 199 }).await?;
    service.register(common::adult_registration("أمين")).await?;
    service.register(common::adult_registration("سارة")).await?;

    let deleted = settings.delete_all_members().await?;
    assert_eq!(deleted, 2);

    let current = settings.get_system_settings().await?;
    assert_eq!(current.member_id_counter, 1);
    assert_eq!(current.current_card_number, 100);
    assert_eq!(SqliteMemberRepository::new(pool).count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_settings_updates() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let settings = SettingsService::new(pool.clone());

    let updated = settings
        .update_setting("member_id_counter", UpdateSettingRequest { value: "40".to_string() })
        .await?;
    assert_eq!(updated.setting_value, "40");

    let unknown = settings
        .update_setting("theme", UpdateSettingRequest { value: "dark".to_string() })
        .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let not_a_number = settings
        .update_setting("card_number_end", UpdateSettingRequest { value: "many".to_string() })
        .await;
    assert!(matches!(not_a_number, Err(AppError::Validation(_))));

    let inverted = settings.update_card_range(CardRangeRequest { start: 10, end: 5 }).await;
    assert!(matches!(inverted, Err(AppError::Validation(_))));

    let season = settings.update_season(SeasonRequest { season: "2526".to_string() }).await?;
    assert_eq!(season.current_season, "2526");

    // New season and counter show up in the next member id
    let dir = tempfile::tempdir()?;
    let service = RegistrationService::new(pool, Arc::new(common::test_storage(dir.path())));
    let member = service.register(common::adult_registration("أمين")).await?;
    assert_eq!(member.member_id, "MJBEA252600040");
    assert_eq!(member.season, "2526");

    let reset = settings.reset_member_id_counter().await?;
    assert_eq!(reset.member_id_counter, 1);

    Ok(())
}
