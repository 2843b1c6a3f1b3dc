use serde::Serialize;

/// One-time login issued when an account is created.
///
/// The initial password equals the username and is never retrievable again;
/// the holder is expected to change it on first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct IssuedCredentials {
    #[schema(example = "team_alpha")]
    pub username: String,
    #[schema(example = "team_alpha")]
    pub password: String,
}

impl IssuedCredentials {
    pub fn for_username(username: &str) -> Self {
        Self {
            username: username.to_string(),
            password: username.to_string(),
        }
    }
}

/// Derive a login name from a display name: lowercase ASCII letters and
/// digits, everything else collapsed into single underscores.
///
/// Returns `None` when nothing usable remains (e.g. an all-symbol name).
pub fn derive_username(prefix: &str, name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        return None;
    }
    let mut username = format!("{prefix}_{slug}");
    username.truncate(32);
    Some(username.trim_end_matches('_').to_string())
}

/// Usernames are 1-32 ASCII letters, digits and underscores.
pub fn check_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() || username.chars().count() > 32 {
        return Err("Username must be 1-32 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username must contain only letters, digits, and underscores");
    }
    Ok(())
}

/// Use `requested` when given, otherwise derive one from `name`.
pub fn resolve_username(
    requested: Option<&str>,
    prefix: &str,
    name: &str,
) -> Result<String, &'static str> {
    let username = match requested.map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => derive_username(prefix, name)
            .ok_or("Cannot derive a username from this name; provide one")?,
    };
    check_username(&username)?;
    Ok(username)
}
