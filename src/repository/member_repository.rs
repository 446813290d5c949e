use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{DocumentRef, Gender, Guardian, Member, MemberDocuments, NewMember},
    error::{AppError, Result},
    repository::MemberRepository,
};

const MEMBER_COLUMNS: &str = r#"
    id, member_id, season, first_name, last_name, birth_date, birth_place_wilaya,
    birth_place_commune, phone, gender, education_level, membership_card_number,
    is_minor, guardian_first_name, guardian_last_name, guardian_national_id,
    guardian_phone, guardian_relation, selected_space, selected_club,
    selected_activity, payment_confirmed, registration_date,
    birth_certificate_url, photo_url, parental_consent_url, medical_certificate_url,
    created_at, updated_at
"#;

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    member_id: String,
    season: String,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    birth_place_wilaya: String,
    birth_place_commune: String,
    phone: String,
    gender: String,
    education_level: String,
    membership_card_number: String,
    is_minor: bool,
    guardian_first_name: Option<String>,
    guardian_last_name: Option<String>,
    guardian_national_id: Option<String>,
    guardian_phone: Option<String>,
    guardian_relation: Option<String>,
    selected_space: String,
    selected_club: String,
    selected_activity: String,
    payment_confirmed: bool,
    registration_date: NaiveDateTime,
    birth_certificate_url: Option<String>,
    photo_url: Option<String>,
    parental_consent_url: Option<String>,
    medical_certificate_url: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        let gender = Gender::parse(&row.gender)
            .ok_or_else(|| AppError::Database(format!("Invalid gender: {}", row.gender)))?;

        // Older rows may flag a minor without guardian details; keep the flag.
        let guardian = row.is_minor.then(|| Guardian {
            first_name: row.guardian_first_name.unwrap_or_default(),
            last_name: row.guardian_last_name.unwrap_or_default(),
            national_id: row.guardian_national_id.unwrap_or_default(),
            phone: row.guardian_phone.unwrap_or_default(),
            relation: row.guardian_relation.unwrap_or_default(),
        });

        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: row.member_id,
            season: row.season,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            birth_place_wilaya: row.birth_place_wilaya,
            birth_place_commune: row.birth_place_commune,
            phone: row.phone,
            gender,
            education_level: row.education_level,
            membership_card_number: row.membership_card_number,
            guardian,
            selected_space: row.selected_space,
            selected_club: row.selected_club,
            selected_activity: row.selected_activity,
            payment_confirmed: row.payment_confirmed,
            registration_date: DateTime::from_naive_utc_and_offset(row.registration_date, Utc),
            documents: MemberDocuments {
                birth_certificate: DocumentRef::from(row.birth_certificate_url),
                photo: DocumentRef::from(row.photo_url),
                parental_consent: DocumentRef::from(row.parental_consent_url),
                medical_certificate: DocumentRef::from(row.medical_certificate_url),
            },
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    /// Insert on an existing connection so callers can include the insert
    /// in a larger transaction.
    pub async fn insert_with(conn: &mut SqliteConnection, member: NewMember) -> Result<Member> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let now_naive = now.naive_utc();
        let guardian = member.guardian.as_ref();

        sqlx::query(
            r#"
            INSERT INTO members (
                id, member_id, season, first_name, last_name, birth_date, birth_place_wilaya,
                birth_place_commune, phone, gender, education_level, membership_card_number,
                is_minor, guardian_first_name, guardian_last_name, guardian_national_id,
                guardian_phone, guardian_relation, selected_space, selected_club,
                selected_activity, payment_confirmed, registration_date,
                birth_certificate_url, photo_url, parental_consent_url, medical_certificate_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&member.member_id)
        .bind(&member.season)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.birth_date)
        .bind(&member.birth_place_wilaya)
        .bind(&member.birth_place_commune)
        .bind(&member.phone)
        .bind(member.gender.as_str())
        .bind(&member.education_level)
        .bind(&member.membership_card_number)
        .bind(guardian.is_some())
        .bind(guardian.map(|g| g.first_name.clone()))
        .bind(guardian.map(|g| g.last_name.clone()))
        .bind(guardian.map(|g| g.national_id.clone()))
        .bind(guardian.map(|g| g.phone.clone()))
        .bind(guardian.map(|g| g.relation.clone()))
        .bind(&member.selected_space)
        .bind(&member.selected_club)
        .bind(&member.selected_activity)
        .bind(member.payment_confirmed)
        .bind(now_naive)
        .bind(member.documents.birth_certificate.as_str())
        .bind(member.documents.photo.as_str())
        .bind(member.documents.parental_consent.as_str())
        .bind(member.documents.medical_certificate.as_str())
        .bind(now_naive)
        .bind(now_naive)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Member id {} already exists", member.member_id))
            }
            other => AppError::Database(other.to_string()),
        })?;

        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::row_to_member(row)
    }

    pub async fn member_id_exists_with(conn: &mut SqliteConnection, member_id: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM members WHERE member_id = ?")
            .bind(member_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.is_some())
    }

    /// Delete every member on an existing connection; returns the count.
    pub async fn delete_all_with(conn: &mut SqliteConnection) -> Result<u64> {
        let result = sqlx::query("DELETE FROM members")
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, member: NewMember) -> Result<Member> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_with(&mut conn, member).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_member).transpose()
    }

    async fn find_by_member_id(&self, member_id: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE member_id = ?",
            MEMBER_COLUMNS
        ))
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_member).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM members WHERE id IN (", MEMBER_COLUMNS));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(") ORDER BY registration_date DESC");

        let rows = builder
            .build_query_as::<MemberRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn list(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members ORDER BY registration_date DESC",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn search(&self, term: &str) -> Result<Vec<Member>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }

        // instr() keeps the match a plain, case-sensitive substring test
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            SELECT {} FROM members
            WHERE instr(first_name, ?1) > 0
               OR instr(last_name, ?1) > 0
               OR instr(member_id, ?1) > 0
               OR instr(selected_activity, ?1) > 0
            ORDER BY registration_date DESC
            "#,
            MEMBER_COLUMNS
        ))
        .bind(term)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}
