use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the bearer tokens this service accepts. Tokens are
/// minted by the auth service; we only verify them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}
