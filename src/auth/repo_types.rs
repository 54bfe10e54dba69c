use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// `password_hash` and `activation_code` never serialize, so no response
/// body can leak them regardless of which handler returns the record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String, // unique
    pub email: String,    // unique
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String, // "admin" | "user"
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub activation_code: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_never_serialize() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Alice Example".into(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "deadbeef".into(),
            role: "user".into(),
            is_active: false,
            activation_code: "cafebabe".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("cafebabe"));
        assert!(!json.contains("passwordHash"));
        assert!(!json.contains("activationCode"));
        assert!(json.contains(r#""username":"alice""#));
        assert!(json.contains(r#""isActive":false"#));
    }
}
