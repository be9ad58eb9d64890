use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
