use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// Serializing this struct exposes the stored hash under the legacy wire
/// name `password`; only the create and role-patch responses do so. Every
/// other response goes through [`crate::users::dto::PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
