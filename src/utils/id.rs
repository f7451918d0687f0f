use crate::models::error::SError;
use regex::Regex;
use std::sync::OnceLock;

const MAX_ID_LEN: usize = 128;

fn valid_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static regex"))
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex"))
}

/// Checks that `id` can be used verbatim as a directory and link name.
pub fn validate_id(id: &str) -> Result<(), SError> {
    if id.len() > MAX_ID_LEN {
        return Err(SError::Validation(format!(
            "addon id '{id}' is longer than {MAX_ID_LEN} characters"
        )));
    }
    if !valid_id().is_match(id) {
        return Err(SError::Validation(format!(
            "addon id '{id}' may only contain letters, digits, '.', '_' and '-' and must start with a letter or digit"
        )));
    }
    Ok(())
}

/// Turns an arbitrary package name into a filesystem-safe id.
pub fn sanitize_id(raw: &str) -> Result<String, SError> {
    let replaced = unsafe_chars().replace_all(raw.trim(), "-");
    let id = replaced.trim_start_matches(['.', '-', '_']).trim_end_matches(['.', '-']);
    let id: String = id.chars().take(MAX_ID_LEN).collect();
    validate_id(&id).map_err(|_| {
        SError::ManifestError(format!("unable to derive an addon id from '{raw}'"))
    })?;
    Ok(id)
}

/// Lowercase, dash-separated form of a display name (used for preset ids).
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric() && c != ' ', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_runs() {
        assert_eq!(sanitize_id("my addon (v2)").unwrap(), "my-addon-v2");
        assert_eq!(sanitize_id("asobo-airport-kjfk").unwrap(), "asobo-airport-kjfk");
        assert_eq!(sanitize_id("..hidden").unwrap(), "hidden");
        assert!(sanitize_id("   ").is_err());
    }

    #[test]
    fn validate_rejects_traversal() {
        assert!(validate_id("../escape").is_err());
        assert!(validate_id(".keeper").is_err());
        assert!(validate_id("a/b").is_err());
        assert!(validate_id("fine_id-1.0").is_ok());
    }

    #[test]
    fn slugify_matches_display_names() {
        assert_eq!(slugify("  Bush Trip: Alaska "), "bush-trip-alaska");
        assert_eq!(slugify("VFR  Europe"), "vfr-europe");
    }
}
