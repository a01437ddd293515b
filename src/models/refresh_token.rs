use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A persisted refresh token. The token string is stored verbatim and is
/// unique across all users.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: 1,
            token: "abc".to_string(),
            user_id: 1,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        assert!(!token_expiring_at(now + Duration::seconds(1)).is_expired_at(now));
        assert!(token_expiring_at(now).is_expired_at(now));
        assert!(token_expiring_at(now - Duration::days(1)).is_expired());
    }
}
