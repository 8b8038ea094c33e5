use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    fn verify_password(plain: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).expect("valid PHC string");
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "s3cret-enough";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn rehash_produces_a_different_hash() {
        let password = "same-input";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        // per-call salt
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse").expect("hashing should succeed");
        assert!(!verify_password("wrong-horse", &hash));
    }

    #[test]
    fn hash_output_is_a_parseable_phc_string() {
        let hash = hash_password("anything").expect("hashing should succeed");
        assert!(PasswordHash::new(&hash).is_ok());
        assert!(PasswordHash::new("not-a-valid-hash").is_err());
    }
}
