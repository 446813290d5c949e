use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use mjbea::{
    config::Settings,
    domain::{
        all_activities, calculate_age, DocumentKind, RegistrationForm, RegistrationRequest, UploadedDocument,
    },
    service::registration_service::{RegistrationService, ADULT_AGE},
    storage::LocalDocumentStorage,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Fill a database with fake registrations.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Number of members to register
    #[arg(short, long, default_value_t = 25)]
    count: usize,

    /// Database URL; defaults to DATABASE_URL, then the configured one
    #[arg(long)]
    database_url: Option<String>,
}

const WILAYAS: &[(&str, &str)] = &[
    ("تبسة", "بئر العاتر"),
    ("تبسة", "الشريعة"),
    ("تبسة", "العقلة"),
    ("خنشلة", "ششار"),
];

const EDUCATION_LEVELS: &[&str] = &["ابتدائي", "متوسط", "ثانوي", "جامعي"];

const RELATIONS: &[&str] = &["الأب", "الأم", "الأخ", "العم"];

// Smallest valid PDF and PNG bodies, enough for the bundle viewer.
const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<<>>endobj\ntrailer<<>>\n%%EOF\n";
const SAMPLE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn pick<T: Copy>(items: &[T]) -> T {
    items[(0..items.len()).fake::<usize>()]
}

fn document(kind: DocumentKind, file_name: &str, data: &[u8]) -> UploadedDocument {
    UploadedDocument {
        kind,
        file_name: file_name.to_string(),
        data: data.to_vec(),
    }
}

fn fake_request() -> RegistrationRequest {
    let year: i32 = (1975..2016).fake();
    let month: u32 = (1..13).fake();
    let day: u32 = (1..29).fake();
    let birth_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
    let is_minor = calculate_age(birth_date) < ADULT_AGE;

    let activity = pick(all_activities());
    let (wilaya, commune) = pick(WILAYAS);
    let last_name: String = LastName().fake();

    let mut documents = vec![
        document(DocumentKind::BirthCertificate, "birth.pdf", SAMPLE_PDF),
        document(DocumentKind::Photo, "photo.png", SAMPLE_PNG),
    ];
    if is_minor {
        documents.push(document(DocumentKind::ParentalConsent, "consent.pdf", SAMPLE_PDF));
    }
    if activity.requires_medical_certificate {
        documents.push(document(DocumentKind::MedicalCertificate, "medical.pdf", SAMPLE_PDF));
    }

    let guardian = |value: String| is_minor.then_some(value);

    RegistrationRequest {
        form: RegistrationForm {
            first_name: FirstName().fake(),
            last_name: last_name.clone(),
            birth_date: birth_date.format("%Y-%m-%d").to_string(),
            birth_place_wilaya: wilaya.to_string(),
            birth_place_commune: commune.to_string(),
            phone: format!("0{}{:08}", pick(&[5, 6, 7]), (0..100_000_000u32).fake::<u32>()),
            gender: pick(&["male", "female"]).to_string(),
            education_level: pick(EDUCATION_LEVELS).to_string(),
            is_minor,
            guardian_first_name: guardian(FirstName().fake()),
            guardian_last_name: guardian(last_name),
            guardian_national_id: guardian(format!("1{:014}", (0..100_000_000_000_000u64).fake::<u64>())),
            guardian_phone: guardian(format!("06{:08}", (0..100_000_000u32).fake::<u32>())),
            guardian_relation: guardian(pick(RELATIONS).to_string()),
            selected_activity: activity.name.to_string(),
            payment_confirmed: true,
        },
        documents,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::new().unwrap_or_default();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| settings.database.url.clone());

    println!("🌱 Seeding {} members into {}", args.count, database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let storage = Arc::new(LocalDocumentStorage::new(&settings.storage));
    let registrations = RegistrationService::new(db_pool, storage);

    let mut created = 0;
    for _ in 0..args.count {
        match registrations.register(fake_request()).await {
            Ok(member) => {
                created += 1;
                println!(
                    "  ✅ {} {} ({}, card {})",
                    member.first_name, member.last_name, member.selected_activity, member.membership_card_number
                );
            }
            Err(e) => {
                println!("  ⚠️  Skipped one registration: {}", e);
            }
        }
    }

    println!("✨ Registered {} of {} members", created, args.count);
    Ok(())
}
