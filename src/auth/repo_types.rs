use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Role, User};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String, // Argon2 PHC string, never leaves the service
    pub role: String,
    pub favorite_offer_ids: Vec<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Everything needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            avatar: self.avatar,
            password_hash: self.password_hash,
            role: self.role.as_str().to_string(),
            favorite_offer_ids: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Drops the password hash on the way out.
impl TryFrom<UserRecord> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            email: r.email,
            avatar: r.avatar,
            role: r.role.parse()?,
            favorite_offer_ids: r.favorite_offer_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> UserRecord {
        NewUser {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "a@x.com".into(),
            avatar: "ann.png".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            role: Role::Regular,
        }
        .into_record()
        .with_role(role)
    }

    impl UserRecord {
        fn with_role(mut self, role: &str) -> Self {
            self.role = role.into();
            self
        }
    }

    #[test]
    fn mapping_strips_password_hash() {
        let user = User::try_from(record("pro")).unwrap();
        assert_eq!(user.role, Role::Pro);

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "pro");
        assert!(json["favoriteOfferIds"].as_array().unwrap().is_empty());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn unknown_role_fails_mapping() {
        assert!(User::try_from(record("admin")).is_err());
    }
}
