//! rusty-reddit/crates/rr-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Reddit.

pub mod error;
pub mod listing;
pub mod models;
pub mod permissions;
pub mod services;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Customer,
            last_login: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn community_kind_serializes_as_type() {
        let now = Utc::now();
        let community = Community {
            id: 1,
            name: "rust".to_string(),
            description: "The Rust language".to_string(),
            creator: 1,
            kind: Some("public".to_string()),
            image: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&community).unwrap();
        assert_eq!(json["type"], "public");
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Staff, Role::Customer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
