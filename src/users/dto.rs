use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// The two roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Raw creation payload. Everything is optional at the serde layer so a
/// missing required field surfaces as a 400 with a message instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: Option<String>,
}

/// Creation payload after validation.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: Role,
}

fn required(field: &'static str, value: Option<String>) -> Result<String, String> {
    let value = value.ok_or_else(|| format!("{field} is required"))?;
    if value.is_empty() {
        return Err(format!("{field} is not allowed to be empty"));
    }
    Ok(value)
}

fn valid_email(value: Option<String>) -> Result<String, String> {
    let email = required("email", value)?;
    if !EMAIL_RE.is_match(&email) {
        return Err("email must be a valid email".into());
    }
    Ok(email)
}

fn valid_role(value: Option<String>) -> Result<Option<Role>, String> {
    match value {
        None => Ok(None),
        Some(s) => Role::parse(&s)
            .map(Some)
            .ok_or_else(|| "role must be one of [user, admin]".into()),
    }
}

impl CreateUserRequest {
    /// Checks fields in declaration order and returns the first violation.
    pub fn validate(self) -> Result<NewUser, String> {
        let first_name = required("firstName", self.first_name)?;
        let last_name = required("lastName", self.last_name)?;
        let email = valid_email(self.email)?;
        let password = self
            .password
            .ok_or_else(|| "password is required".to_string())?;
        if password.len() < 5 {
            return Err("password length must be at least 5 characters long".into());
        }
        let role = valid_role(self.role)?.unwrap_or(Role::User);
        Ok(NewUser {
            first_name,
            last_name,
            email,
            password,
            profile_picture: self.profile_picture,
            phone: self.phone,
            visa: self.visa,
            role,
        })
    }
}

/// Raw update payload. Same shape as creation, but the password may be the
/// empty string, which means "keep the stored hash".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: Option<String>,
}

/// Update payload after validation. `password: None` keeps the stored
/// hash; absent optional fields keep their stored values.
#[derive(Debug)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserUpdate, String> {
        let first_name = required("firstName", self.first_name)?;
        let last_name = required("lastName", self.last_name)?;
        let email = valid_email(self.email)?;
        let password = self
            .password
            .ok_or_else(|| "password is required".to_string())?;
        let role = valid_role(self.role)?;
        Ok(UserUpdate {
            first_name,
            last_name,
            email,
            password: if password.is_empty() { None } else { Some(password) },
            profile_picture: self.profile_picture,
            phone: self.phone,
            visa: self.visa,
            role,
        })
    }
}

/// Role-patch payload.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

/// Public part of a user, password stripped.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub visa: Option<String>,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            profile_picture: u.profile_picture,
            phone: u.phone,
            visa: u.visa,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    25
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub data: Vec<PublicUser>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
}

impl UserPage {
    pub fn new(data: Vec<PublicUser>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total == 0 { 1 } else { (total + limit - 1) / limit };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
            has_prev_page: page > 1,
            has_next_page: page < total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub data: PublicUser,
}

/// Legacy creation envelope; serializes the row including the hash.
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub created: User,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub updated: PublicUser,
}

/// Legacy role-patch envelope; serializes the row including the hash.
#[derive(Debug, Serialize)]
pub struct PatchedRole {
    pub updated: User,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub deleted: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_create() -> CreateUserRequest {
        serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "s3cret",
        }))
        .unwrap()
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            profile_picture: None,
            phone: None,
            visa: None,
            role: "user".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn create_defaults_role_to_user() {
        let new = full_create().validate().unwrap();
        assert_eq!(new.role, Role::User);
        assert_eq!(new.email, "ada@example.com");
    }

    #[test]
    fn create_reports_first_violation_in_order() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "email": "not-an-email",
            "password": "x",
        }))
        .unwrap();
        // firstName is checked before the bad email and short password
        assert_eq!(req.validate().unwrap_err(), "firstName is required");
    }

    #[test]
    fn create_rejects_bad_email() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "nope",
            "password": "s3cret",
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err(), "email must be a valid email");
    }

    #[test]
    fn create_rejects_short_password() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "1234",
        }))
        .unwrap();
        assert_eq!(
            req.validate().unwrap_err(),
            "password length must be at least 5 characters long"
        );
    }

    #[test]
    fn create_rejects_unknown_role() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "s3cret",
            "role": "root",
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err(), "role must be one of [user, admin]");
    }

    #[test]
    fn update_treats_empty_password_as_keep() {
        let req: UpdateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "",
        }))
        .unwrap();
        let upd = req.validate().unwrap();
        assert!(upd.password.is_none());
        assert!(upd.role.is_none());
    }

    #[test]
    fn update_accepts_short_nonempty_password() {
        let req: UpdateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "ab",
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap().password.as_deref(), Some("ab"));
    }

    #[test]
    fn update_requires_password_field() {
        let req: UpdateUserRequest = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err(), "password is required");
    }

    #[test]
    fn public_user_strips_password() {
        let public = PublicUser::from(sample_user());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "Ada");
    }

    #[test]
    fn created_envelope_carries_the_hash() {
        let created = CreatedUser {
            created: sample_user(),
        };
        let json = serde_json::to_value(&created).unwrap();
        assert!(json["created"]["password"]
            .as_str()
            .unwrap()
            .starts_with("$argon2"));
    }

    #[test]
    fn list_params_default_to_page_1_limit_25() {
        let p: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!((p.page, p.limit), (1, 25));
    }

    #[test]
    fn page_metadata_math() {
        let page = UserPage::new(Vec::new(), 5, 1, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_prev_page);
        assert!(page.has_next_page);

        let last = UserPage::new(Vec::new(), 5, 3, 2);
        assert!(last.has_prev_page);
        assert!(!last.has_next_page);

        let empty = UserPage::new(Vec::new(), 0, 1, 25);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next_page);
    }
}
