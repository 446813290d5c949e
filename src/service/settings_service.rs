use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::{
    domain::{
        generate_member_id, CardRangeRequest, SeasonRequest, SystemSetting, SystemSettings, UpdateSettingRequest,
        CARD_NUMBER_END, CARD_NUMBER_START, CURRENT_CARD_NUMBER, CURRENT_SEASON,
        MEMBER_ID_COUNTER, SETTING_KEYS,
    },
    error::{AppError, Result},
    repository::SqliteMemberRepository,
};

#[derive(FromRow)]
struct SettingRow {
    setting_key: String,
    setting_value: String,
    updated_at: NaiveDateTime,
}

/// Identifiers handed to one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedIdentifiers {
    pub member_counter: i64,
    pub member_id: String,
    pub card_number: i64,
    pub season: String,
}

pub struct SettingsService {
    pool: SqlitePool,
}

impl SettingsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_setting(row: SettingRow) -> SystemSetting {
        SystemSetting {
            setting_key: row.setting_key,
            setting_value: row.setting_value,
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        }
    }

    pub async fn get_all_settings(&self) -> Result<Vec<SystemSetting>> {
        let rows = sqlx::query_as::<_, SettingRow>(
            r#"
            SELECT setting_key, setting_value, updated_at
            FROM system_settings
            ORDER BY setting_key
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Self::row_to_setting).collect())
    }

    pub async fn get_system_settings(&self) -> Result<SystemSettings> {
        let settings = self.get_all_settings().await?;
        Ok(SystemSettings::from_settings(&settings))
    }

    pub async fn get_setting(&self, key: &str) -> Result<SystemSetting> {
        let row = sqlx::query_as::<_, SettingRow>(
            r#"
            SELECT setting_key, setting_value, updated_at
            FROM system_settings
            WHERE setting_key = ?
            "#
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Setting not found: {}", key)))?;

        Ok(Self::row_to_setting(row))
    }

    /// Overwrite a single known setting. Concurrent writers: last one wins.
    pub async fn update_setting(&self, key: &str, request: UpdateSettingRequest) -> Result<SystemSetting> {
        if !SETTING_KEYS.contains(&key) {
            return Err(AppError::BadRequest(format!("Unknown setting: {}", key)));
        }

        let value = request.value.trim();
        if key == CURRENT_SEASON {
            validate_season(value)?;
        } else {
            let number: i64 = value
                .parse()
                .map_err(|_| AppError::Validation(format!("{} must be a whole number", key)))?;
            if number < 1 {
                return Err(AppError::Validation(format!("{} must be at least 1", key)));
            }
        }

        let mut conn = self.pool.acquire().await?;
        write_setting(&mut conn, key, value).await?;
        drop(conn);

        tracing::info!("Setting {} updated to {}", key, value);
        self.get_setting(key).await
    }

    pub async fn reset_member_id_counter(&self) -> Result<SystemSettings> {
        let mut conn = self.pool.acquire().await?;
        write_setting(&mut conn, MEMBER_ID_COUNTER, "1").await?;
        drop(conn);

        tracing::info!("Member id counter reset");
        self.get_system_settings().await
    }

    /// Replace the card number range and restart numbering at its start.
    pub async fn update_card_range(&self, request: CardRangeRequest) -> Result<SystemSettings> {
        if request.start < 1 {
            return Err(AppError::Validation("Card range must start at 1 or above".to_string()));
        }
        if request.start > request.end {
            return Err(AppError::Validation(
                "Card range start must not exceed its end".to_string(),
            ));
        }

        let start = request.start.to_string();
        let mut tx = self.pool.begin().await?;
        write_setting(&mut tx, CARD_NUMBER_START, &start).await?;
        write_setting(&mut tx, CARD_NUMBER_END, &request.end.to_string()).await?;
        write_setting(&mut tx, CURRENT_CARD_NUMBER, &start).await?;
        tx.commit().await?;

        tracing::info!("Card range set to {}..={}", request.start, request.end);
        self.get_system_settings().await
    }

    pub async fn update_season(&self, request: SeasonRequest) -> Result<SystemSettings> {
        let season = request.season.trim();
        validate_season(season)?;

        let mut conn = self.pool.acquire().await?;
        write_setting(&mut conn, CURRENT_SEASON, season).await?;
        drop(conn);

        tracing::info!("Season set to {}", season);
        self.get_system_settings().await
    }

    /// Remove every member and restart both counters. Stored documents are
    /// left in place.
    pub async fn delete_all_members(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted = SqliteMemberRepository::delete_all_with(&mut tx).await?;
        write_setting(&mut tx, MEMBER_ID_COUNTER, "1").await?;
        sqlx::query(
            r#"
            UPDATE system_settings
            SET setting_value = COALESCE(
                    (SELECT setting_value FROM system_settings WHERE setting_key = ?),
                    '1'
                ),
                updated_at = ?
            WHERE setting_key = ?
            "#
        )
        .bind(CARD_NUMBER_START)
        .bind(Utc::now().naive_utc())
        .bind(CURRENT_CARD_NUMBER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::warn!("Deleted all {} members and reset counters", deleted);
        Ok(deleted)
    }

    /// Take the next free member id and card number inside the caller's
    /// transaction. Each counter is read-and-incremented by a single
    /// statement, so two registrations can never observe the same value.
    /// Counter values whose member id already exists in the current season
    /// are passed over. Returns `Conflict` once the card range is used up.
    pub async fn allocate_identifiers(conn: &mut SqliteConnection) -> Result<AllocatedIdentifiers> {
        ensure_defaults(conn).await?;
        let now = Utc::now().naive_utc();

        let season = sqlx::query_scalar::<_, String>(
            "SELECT setting_value FROM system_settings WHERE setting_key = ?",
        )
        .bind(CURRENT_SEASON)
        .fetch_optional(&mut *conn)
        .await?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| SystemSettings::default().current_season);

        let (member_counter, member_id) = loop {
            let counter = take_member_counter(conn, now).await?;
            let member_id = generate_member_id(counter, &season);
            if !SqliteMemberRepository::member_id_exists_with(conn, &member_id).await? {
                break (counter, member_id);
            }
            tracing::warn!("Member id {} is already taken, skipping counter {}", member_id, counter);
        };

        let card_number = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE system_settings
            SET setting_value = CAST(CAST(setting_value AS INTEGER) + 1 AS TEXT),
                updated_at = ?
            WHERE setting_key = ?
              AND CAST(setting_value AS INTEGER) <= COALESCE(
                    (SELECT CAST(setting_value AS INTEGER)
                     FROM system_settings WHERE setting_key = ?),
                    1000
                  )
            RETURNING CAST(setting_value AS INTEGER) - 1
            "#
        )
        .bind(now)
        .bind(CURRENT_CARD_NUMBER)
        .bind(CARD_NUMBER_END)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("No membership card numbers left in the configured range".to_string())
        })?;

        Ok(AllocatedIdentifiers {
            member_counter,
            member_id,
            card_number,
            season,
        })
    }
}

async fn take_member_counter(conn: &mut SqliteConnection, now: NaiveDateTime) -> Result<i64> {
    let counter = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE system_settings
        SET setting_value = CAST(CAST(setting_value AS INTEGER) + 1 AS TEXT),
            updated_at = ?
        WHERE setting_key = ?
        RETURNING CAST(setting_value AS INTEGER) - 1
        "#
    )
    .bind(now)
    .bind(MEMBER_ID_COUNTER)
    .fetch_one(&mut *conn)
    .await?;

    Ok(counter)
}

fn validate_season(season: &str) -> Result<()> {
    if season.is_empty() || season.len() > 16 || !season.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(
            "Season must be a short alphanumeric code such as 2425".to_string(),
        ));
    }
    Ok(())
}

async fn write_setting(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (setting_key, setting_value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(setting_key) DO UPDATE SET
            setting_value = excluded.setting_value,
            updated_at = excluded.updated_at
        "#
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now().naive_utc())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Recreate any setting row that has gone missing with its default value.
async fn ensure_defaults(conn: &mut SqliteConnection) -> Result<()> {
    let defaults = SystemSettings::default();
    let rows = [
        (MEMBER_ID_COUNTER, defaults.member_id_counter.to_string()),
        (CURRENT_SEASON, defaults.current_season.clone()),
        (CURRENT_CARD_NUMBER, defaults.current_card_number.to_string()),
        (CARD_NUMBER_START, defaults.card_number_start.to_string()),
        (CARD_NUMBER_END, defaults.card_number_end.to_string()),
    ];

    for (key, value) in rows {
        sqlx::query("INSERT OR IGNORE INTO system_settings (setting_key, setting_value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_must_be_alphanumeric() {
        assert!(validate_season("2425").is_ok());
        assert!(validate_season("").is_err());
        assert!(validate_season("24/25").is_err());
        assert!(validate_season("2425; DROP").is_err());
    }
}
