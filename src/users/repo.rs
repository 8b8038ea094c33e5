use sqlx::PgPool;
use uuid::Uuid;

use super::dto::{NewUser, UserUpdate};
use super::repo_types::User;

const COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, profile_picture, phone, visa, role, created_at";

impl User {
    /// One page of users plus the total row count.
    pub async fn paginate(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<(Vec<User>, i64)> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;

        Ok((rows, total))
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {COLUMNS} FROM users WHERE id = $1"#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {COLUMNS} FROM users WHERE email = $1"#,
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user with an already-hashed password.
    pub async fn create(db: &PgPool, new: &NewUser, password_hash: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash,
                               profile_picture, phone, visa, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(password_hash)
        .bind(new.profile_picture.as_deref())
        .bind(new.phone.as_deref())
        .bind(new.visa.as_deref())
        .bind(new.role.as_str())
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Full update of the mutable fields. Optional columns keep their
    /// stored value when the payload left them out; the hash is replaced
    /// only when a new one is supplied.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        upd: &UserUpdate,
        password_hash: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                email = $4,
                password_hash = COALESCE($5, password_hash),
                profile_picture = COALESCE($6, profile_picture),
                phone = COALESCE($7, phone),
                visa = COALESCE($8, visa),
                role = COALESCE($9, role)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&upd.first_name)
        .bind(&upd.last_name)
        .bind(&upd.email)
        .bind(password_hash)
        .bind(upd.profile_picture.as_deref())
        .bind(upd.phone.as_deref())
        .bind(upd.visa.as_deref())
        .bind(upd.role.map(|r| r.as_str()))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn update_role(db: &PgPool, id: Uuid, role: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET role = $2 WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            DELETE FROM users WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
