//! Hash helpers – abstracción para poder cambiar de algoritmo sin tocar el
//! resto del workspace.

use blake3::Hasher;
use sha2::{Digest, Sha256};

/// Hashea un string con blake3 y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un string con SHA-256 y devuelve hex.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{:x}", digest)
}
