//! Auth token generation.
//!
//! Tokens are not generated by the server itself: an operator creates one
//! with the `generate-token` binary and sets it as `AUTH_TOKEN`.

/// Random bytes per token; the hex form is twice as long.
pub const TOKEN_BYTES: usize = 20;

/// Generate a fresh random token as lowercase hex.
pub fn generate() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// The line printed for the operator.
pub fn announce(token: &str) -> String {
    format!("New token generated: AUTHKEY=\"{token}\"")
}
