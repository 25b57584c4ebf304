//! Static membership tables consulted while verifying an address.
//!
//! Both tables are compile-time `phf` sets, so concurrent verifications can
//! read them without synchronisation.

use phf::phf_set;

static DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "temp-mail.org",
    "mailinator.com",
    "10minutemail.com",
    "10minutemail.net",
    "guerrillamail.com",
    "guerrillamail.net",
    "guerrillamail.org",
    "sharklasers.com",
    "grr.la",
    "yopmail.com",
    "yopmail.net",
    "trashmail.com",
    "trashmail.de",
    "getnada.com",
    "dispostable.com",
    "maildrop.cc",
    "mailnesia.com",
    "tempmail.net",
    "throwawaymail.com",
    "fakeinbox.com",
    "mintemail.com",
    "mohmal.com",
    "emailondeck.com",
    "spamgourmet.com",
    "mytemp.email",
    "tempr.email",
    "discard.email",
    "burnermail.io",
};

static ROLE_ACCOUNTS: phf::Set<&'static str> = phf_set! {
    "info",
    "admin",
    "sales",
    "contact",
    "support",
    "help",
    "office",
    "billing",
    "abuse",
    "postmaster",
    "hostmaster",
    "webmaster",
    "noreply",
    "no-reply",
    "marketing",
    "press",
    "media",
    "jobs",
    "careers",
    "hr",
    "legal",
    "privacy",
    "security",
    "team",
    "hello",
    "enquiries",
    "inquiries",
    "feedback",
    "newsletter",
};

/// `true` when `domain` (case-insensitive) belongs to a known throwaway-mailbox provider.
pub fn is_disposable_domain(domain: &str) -> bool {
    DISPOSABLE_DOMAINS.contains(domain.trim().to_ascii_lowercase().as_str())
}

/// `true` when `local` (case-insensitive) names a function rather than a person.
pub fn is_role_account(local: &str) -> bool {
    ROLE_ACCOUNTS.contains(local.trim().to_ascii_lowercase().as_str())
}
