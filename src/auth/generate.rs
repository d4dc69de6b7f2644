use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, Rng, RngCore};

/// Uniformly random six-digit verification code. The range starts at 100000,
/// so the first digit is never zero and the length is always exactly six.
pub fn six_digit_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn random_id(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Opaque primary key for user and token rows. 128 bits of OS entropy,
/// no ordering semantics.
pub fn entity_id() -> String {
    random_id(16)
}

/// Session ids double as the cookie value, so they get a wider margin.
pub fn session_id() -> String {
    random_id(32)
}
