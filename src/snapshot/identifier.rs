//! Identifier Policy
//!
//! Stable, filesystem-safe names for per-entity snapshot units. The same
//! derivation names the file, the orchestrator's module declaration and the
//! invocation, so it must stay the only place identifiers come from.

use crate::error::{require, SnapshotResult};
use crate::model::EntityDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Suffix appended to every entity unit identifier
pub const IDENTIFIER_SUFFIX: &str = "Snapshot";

/// Maximum length of the name part, before the suffix
pub const MAX_NAME_LENGTH: usize = 200;

/// Characters no target filesystem accepts in a file name
static ILLEGAL_PATH_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("illegal path character pattern is valid")
});

/// Compute the unit identifier for an entity.
///
/// Illegal path characters become `_`, the name is cut to
/// [`MAX_NAME_LENGTH`] characters, then [`IDENTIFIER_SUFFIX`] is appended.
/// Two long names sharing a 200-character prefix collide here; the split
/// coordinator rejects such models.
pub fn identifier_for(entity: &EntityDescriptor) -> SnapshotResult<String> {
    let candidate = entity.identifier_name();
    require(candidate, "entity name")?;

    let sanitized = ILLEGAL_PATH_CHARS.replace_all(candidate, "_");
    let mut identifier: String = sanitized.chars().take(MAX_NAME_LENGTH).collect();
    identifier.push_str(IDENTIFIER_SUFFIX);

    Ok(identifier)
}

/// Module name under which the orchestrator declares a unit.
///
/// ASCII identifiers that already are Rust identifiers are used as is.
/// Everything else goes through [`mangled_module_name`]. Non-ASCII names are
/// always mangled because the compiler NFC-normalizes identifiers, which
/// could merge two distinct file names into one module.
pub fn module_name_for(identifier: &str) -> String {
    if is_plain_ident(identifier) {
        identifier.to_string()
    } else {
        mangled_module_name(identifier)
    }
}

/// Module name with identifier characters kept, everything else replaced by
/// `_`, and a short hash of the full identifier appended. Distinct
/// identifiers give distinct names; no plain identifier (which ends in
/// [`IDENTIFIER_SUFFIX`]) ever ends in a hash.
pub fn mangled_module_name(identifier: &str) -> String {
    let mut name: String = identifier
        .chars()
        .map(|c| if is_ident_continue(c) { c } else { '_' })
        .collect();
    if !name.chars().next().is_some_and(is_ident_start) {
        name.insert(0, '_');
    }

    let digest = format!("{:x}", Sha256::digest(identifier.as_bytes()));
    name.push('_');
    name.push_str(&digest[..8]);
    name
}

fn is_plain_ident(value: &str) -> bool {
    value.is_ascii() && !value.starts_with("r#") && syn::parse_str::<syn::Ident>(value).is_ok()
}

fn is_ident_start(c: char) -> bool {
    c == '_'
        || c.is_ascii_alphabetic()
        || (!c.is_ascii() && syn::parse_str::<syn::Ident>(&c.to_string()).is_ok())
}

fn is_ident_continue(c: char) -> bool {
    c == '_'
        || c.is_ascii_alphanumeric()
        || (!c.is_ascii() && syn::parse_str::<syn::Ident>(&format!("_{}", c)).is_ok())
}
