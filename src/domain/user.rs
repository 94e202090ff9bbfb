use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::{ColumnMetadata, ColumnType, Entity, EntityMetadata};

// Columns are illustrative: the users module owns the real record.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    fn metadata() -> EntityMetadata {
        EntityMetadata {
            name: "User",
            table: None,
            columns: vec![
                ColumnMetadata::new("id", ColumnType::Uuid).primary(),
                ColumnMetadata::new("email", ColumnType::Text).unique(),
                ColumnMetadata::new("username", ColumnType::Text).unique(),
                ColumnMetadata::new("passwordHash", ColumnType::Text),
                ColumnMetadata::new("isAdmin", ColumnType::Boolean)
                    .default("false"),
                ColumnMetadata::new("createdAt", ColumnType::Timestamptz)
                    .default("now()"),
                ColumnMetadata::new("updatedAt", ColumnType::Timestamptz)
                    .default("now()"),
            ],
        }
    }
}
