//! Identifier generation
//!
//! Ids are the base-36 millisecond timestamp followed by a base-36 random
//! tail, so they sort roughly by creation time and stay short enough for
//! storage keys.

use chrono::Utc;
use uuid::Uuid;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random tail appended to the timestamp
const RANDOM_TAIL_LEN: usize = 11;

pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let random = Uuid::new_v4().as_u128();

    let mut id = to_base36(millis);
    let tail = to_base36(random);
    id.push_str(&tail[..tail.len().min(RANDOM_TAIL_LEN)]);
    id
}

/// Node ids handed out by the editor for nodes and edges it creates
pub fn generate_prefixed_id(prefix: &str) -> String {
    format!("{}-{}", prefix, generate_id())
}

pub fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_ids_are_storage_key_safe() {
        let id = generate_id();
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(generate_prefixed_id("node").starts_with("node-"));
    }
}
