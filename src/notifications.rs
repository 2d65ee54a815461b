//! Local notifications. Delivery is disabled: both entry points log what they would have done and
//! return immediately, and nothing else in the crate depends on their results.

use chrono::{DateTime, Utc};
use tracing::info;

/// Would prepare the platform notification channel. Always returns `false`.
pub async fn setup_notifications() -> bool {
    info!("Notifications are currently disabled");
    false
}

/// Would schedule a notification for `date` and return its platform id. Always returns `None`.
pub async fn schedule_local_notification(
    title: &str,
    body: &str,
    date: DateTime<Utc>,
) -> Option<String> {
    info!("Notification would have been scheduled: {title} - {body} at {date}");
    None
}

#[tokio::test]
async fn notifications_are_disabled_test() {
    assert!(!setup_notifications().await);
    assert_eq!(
        schedule_local_notification("Kira", "Pay the rent", Utc::now()).await,
        None
    );
}
