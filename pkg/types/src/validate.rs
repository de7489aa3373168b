use crate::error::{Error, Result};

/// Validate a Kubernetes-style resource name.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("name must not be empty"));
    }
    if name.len() > 63 {
        return Err(Error::validation(format!(
            "name '{}' exceeds 63 characters (got {})",
            name,
            name.len()
        )));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(Error::validation(format!(
            "name '{}' must not start or end with a hyphen",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(Error::validation(format!(
            "name '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            name
        )));
    }
    Ok(())
}
