use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::auth::password::hash_blocking;
use crate::auth::Role;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{AccountStatus, User};
use crate::database::{DatabaseManager, PgStore, Repository};
use crate::filter::{PredicateBuilder, SqlParam};

/// Demo accounts: (email, password, full name, role)
const DEMO_ACCOUNTS: [(&str, &str, &str, Role); 2] = [
    ("admin@vozanimal.com", "admin123", "Administrador Voz Animal", Role::Admin),
    ("juan@gmail.com", "user123", "Juan Pérez", Role::User),
];

pub async fn migrate(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(output_format, "Database schema applied", None)
}

pub async fn init_passwords(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    let users: Repository<User> = Repository::new(Arc::new(PgStore::new(pool)));

    let mut accounts = Vec::new();
    for (email, password, full_name, role) in DEMO_ACCOUNTS {
        let hash = hash_blocking(password.to_string()).await?;
        let existing = users
            .select_one(PredicateBuilder::new().eq("email", email).build())
            .await?;

        match existing {
            Some(user) => {
                users.update_by_id(user.id, vec![("password", hash.into())]).await?;
                tracing::info!("Reset password for {}", email);
            }
            None => {
                users
                    .insert(vec![
                        ("nombre_completo", full_name.into()),
                        ("email", email.into()),
                        ("password", hash.into()),
                        ("telefono", SqlParam::Null),
                        ("direccion", SqlParam::Null),
                        ("rol", role.as_str().into()),
                        ("fecha_registro", SqlParam::Timestamp(Utc::now())),
                        ("estado", AccountStatus::Active.as_str().into()),
                    ])
                    .await?;
                tracing::info!("Created demo account {}", email);
            }
        }
        accounts.push(json!({ "email": email, "password": password, "rol": role.as_str() }));
    }

    output_success(
        output_format,
        "Demo account passwords initialized",
        Some(json!({ "accounts": accounts })),
    )
}
