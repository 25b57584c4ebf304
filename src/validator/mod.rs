mod types;

pub use types::AddressParts;

use std::sync::LazyLock;

use regex::Regex;

/// local-part: ASCII letters, digits and `_.+-`.
/// domain: two or more dot-separated labels of letters, digits and `-`.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.+\-]+)@([A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+)$")
        .expect("address pattern failed to compile, this is a bug")
});

/// Splits `email` into local part and domain when it matches the conservative
/// address grammar. Surrounding whitespace is ignored.
pub fn parse_address(email: &str) -> Option<AddressParts> {
    let caps = ADDRESS_RE.captures(email.trim())?;
    Some(AddressParts {
        local: caps[1].to_string(),
        domain: caps[2].to_ascii_lowercase(),
    })
}

pub fn is_valid_syntax(email: &str) -> bool {
    parse_address(email).is_some()
}
