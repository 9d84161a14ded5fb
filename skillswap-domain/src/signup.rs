//! Signup derivation
//!
//! A new account is derived entirely from the email address: display name
//! from the local part, college from the domain, and a generated avatar.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::entities::User;
use crate::value_objects::{DomainError, UserId};
use std::collections::BTreeSet;

/// Personal mail providers that say nothing about a college
const COMMON_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "me.com",
];

const HAIR_VARIANTS: &[&str] = &["long01", "long06", "short01", "short05", "shaved01"];

/// Characters `encodeURIComponent` leaves as they are
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/lorelei/svg";

/// Split and check an email of the form `local@domain.tld`
///
/// # Errors
/// Returns `DomainError::InvalidEmail` on whitespace, a missing `@`, an empty
/// local part, or a domain without an inner dot.
pub fn parse_email(email: &str) -> Result<(&str, &str), DomainError> {
    let invalid = || DomainError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(invalid());
    }

    Ok((local, domain))
}

/// College label for an email domain
pub fn college_for_domain(domain: &str) -> String {
    let domain = domain.to_lowercase();
    if COMMON_PROVIDERS.contains(&domain.as_str()) {
        return "Independent Learner".to_string();
    }

    let label = domain.split('.').next().unwrap_or_default();
    format!("{} Community", label.to_uppercase())
}

/// Capitalize the first character of the local part
pub fn display_name_for(local: &str) -> String {
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Deterministic default avatar for an email
pub fn default_avatar_for(email: &str) -> String {
    let index = email.bytes().map(usize::from).sum::<usize>() % HAIR_VARIANTS.len();
    format!(
        "{}?seed={}&hair={}&backgroundColor=b6e3f4,c0aede,d1d4f9",
        AVATAR_BASE_URL,
        utf8_percent_encode(email, URI_COMPONENT),
        HAIR_VARIANTS[index]
    )
}

impl User {
    /// Derive a fresh user from an email address
    ///
    /// # Errors
    /// Returns `DomainError::InvalidEmail` if the email is malformed
    pub fn from_email(email: &str) -> Result<Self, DomainError> {
        let email = email.trim();
        let (local, domain) = parse_email(email)?;

        Ok(Self {
            id: UserId::generate(),
            name: display_name_for(local),
            email: email.to_string(),
            college: college_for_domain(domain),
            branch: "General Studies".to_string(),
            year: "Class of 2026".to_string(),
            avatar: default_avatar_for(email),
            skills: BTreeSet::new(),
            reputation: 5.0,
            trades_completed: 0,
        })
    }
}
