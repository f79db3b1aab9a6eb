use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// Opaque bearer token: 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
