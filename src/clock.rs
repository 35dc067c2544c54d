use chrono::DateTime;
use chrono::Utc;

/// Time source injected into the services so the date-window rules can be
/// exercised against a controlled clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used by the running server.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
