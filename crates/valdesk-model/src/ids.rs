#![deny(unsafe_code)]

/// Length of a generated record id, in hex characters.
pub const SHORT_ID_LEN: usize = 8;

/// Generate a short opaque record id: 8 lowercase hex characters drawn from
/// UUIDv4 entropy.
///
/// Collision-resistant in practice for datasets of this size, not a
/// guarantee of global uniqueness.
pub fn short_id() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    hex::encode(&bytes[..SHORT_ID_LEN / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_short_lowercase_hex() {
        let id = short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn repeated_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| short_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
