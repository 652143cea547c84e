//! Concatenation KDF (NIST SP 800-56A) over SHA-256
//!
//! Block `i` is `SHA-256(be32(i) || secret)` for `i = 1, 2, ...`; the output is the
//! concatenation of blocks truncated to the requested length.

use sha2::{Digest, Sha256};

use super::secret::{Secret, SECRET_SIZE};

const BLOCK_SIZE: usize = 32;

/// Fill `out` with key material derived from `secret`
pub fn kdf(secret: &[u8], out: &mut [u8]) {
    for (counter, chunk) in (1u32..).zip(out.chunks_mut(BLOCK_SIZE)) {
        let block = Sha256::new()
            .chain_update(counter.to_be_bytes())
            .chain_update(secret)
            .finalize();
        chunk.copy_from_slice(&block[..chunk.len()]);
    }
}

/// Derive a 32-byte symmetric key from raw shared secret bytes
pub fn derive_key(secret: &[u8]) -> Secret {
    let mut key = [0u8; SECRET_SIZE];
    kdf(secret, &mut key);
    let derived = Secret::from(key);
    zeroize::Zeroize::zeroize(&mut key);
    derived
}
