//! ID generation utilities.

use uuid::Uuid;

/// Generate a new UUID v4.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short random ID (8 hex characters).
pub fn short_id() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}

/// Normalize an identifier.
///
/// - Converts to lowercase
/// - Replaces spaces and dashes with underscores
/// - Removes non-alphanumeric characters (except underscores)
pub fn normalize(id: &str) -> String {
    id.to_lowercase()
        .replace([' ', '-'], "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_unique() {
        assert_ne!(uuid(), uuid());
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(short_id().len(), 8);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Grupo huntRED"), "grupo_huntred");
        assert_eq!(normalize("hunt-u"), "hunt_u");
        assert_eq!(normalize("a!b@c"), "abc");
    }
}
