//! Print a fresh auth token for the server's `AUTH_TOKEN`.
//!
//! Not run in production: generate the token locally, then set it on the
//! server yourself.

use postcode_server::token;

fn main() {
    println!("{}", token::announce(&token::generate()));
}
