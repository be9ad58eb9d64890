use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::helpers::time::now;

/// Cached bearer value with the moment it was stored and how long it may be used.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub obtained_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CachedToken {
    pub fn new(value: String, ttl: Duration) -> Self {
        Self { value, obtained_at: now(), ttl }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        // ttl beyond chrono's range never expires in practice
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        self.obtained_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Usable only while `now < obtained_at + ttl`.
    pub fn is_fresh_at(&self, at: DateTime<Utc>) -> bool {
        at < self.expires_at()
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(now())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_ttl_is_never_fresh() {
        let token = CachedToken::new("T".into(), Duration::ZERO);
        assert!(!token.is_fresh());
    }

    #[test]
    fn fresh_until_ttl_elapses() {
        let token = CachedToken::new("T".into(), Duration::from_secs(60));
        assert!(token.is_fresh());
        let later = token.obtained_at + chrono::Duration::seconds(60);
        assert!(!token.is_fresh_at(later));
        let earlier = token.obtained_at + chrono::Duration::seconds(59);
        assert!(token.is_fresh_at(earlier));
    }
}
