use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Credentials are stored as a salt plus the SHA-256 digest of
/// `salt || plaintext`. Unlike the teacher's client-compat MD5 hash, nothing
/// here needs to match an external binary protocol, so we hash directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordHash {
    pub salt: String,
    pub digest: String,
}

impl PasswordHash {
    pub fn new(plaintext: &str, salt: String) -> Self {
        Self {
            digest: hash_with_salt(&salt, plaintext),
            salt,
        }
    }

    pub fn verify(&self, plaintext: &str) -> bool {
        self.digest == hash_with_salt(&self.salt, plaintext)
    }
}

fn hash_with_salt(salt: &str, plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn generate_salt() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}
