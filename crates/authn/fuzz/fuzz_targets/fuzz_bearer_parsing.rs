//! Fuzz target for bearer token parsing and validation.
//!
//! Feeds arbitrary byte strings as bearer tokens and `Authorization` header
//! values. Every result must be either `Ok(...)` or `Err(AuthError)`, and a
//! random input must never validate.

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use pases_authn::{
    BearerValidator, validate_algorithm,
    testutil::{ManualClock, test_config},
};

fn validator() -> &'static BearerValidator {
    static VALIDATOR: OnceLock<BearerValidator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        BearerValidator::new(&test_config(), ManualClock::default().shared())
            .expect("validator from test config")
    })
}

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8; bearer tokens are always UTF-8 strings
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary input cannot carry a valid HS256 signature for the test secret
    assert!(validator().parse(token).is_err());
    let _ = validator().parse_authorization_header(token);
    let _ = validator().parse_authorization_header(&format!("Bearer {token}"));

    // The algorithm policy must not panic on any header value
    let _ = validate_algorithm(token);
});
