use uuid::Uuid;

use crate::constants::{truncate_safe, DISPLAY_NAME_PREFIX, SHORT_ID_CHARS, UNKNOWN_USER};

/// Genere un nouvel identifiant utilisateur (UUID v4, 36 chars avec tirets)
pub fn user_id() -> String {
    Uuid::new_v4().to_string()
}

/// Prefix court d'un identifiant (8 premiers chars)
pub fn short_id(id: &str) -> &str {
    truncate_safe(id, SHORT_ID_CHARS)
}

/// Nom affichable derive de l'identifiant: `user_1a2b3c4d`
pub fn display_name(user_id: &str) -> String {
    if user_id.is_empty() {
        return UNKNOWN_USER.to_string();
    }
    format!("{}{}", DISPLAY_NAME_PREFIX, short_id(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = user_id();
        let b = user_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("1a2b3c4d-ffff"), "user_1a2b3c4d");
        assert_eq!(display_name("abc"), "user_abc");
        assert_eq!(display_name(""), "unknown user");
    }
}
