/// Billing events from the payment provider
///
/// Only `user.upgraded` changes state; every other event is acknowledged and
/// ignored so the provider stops retrying it.

use serde::Deserialize;

use crate::error::AppError;
use crate::store::{Store, UserId};

pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct BillingEvent {
    pub event: String,
    pub data: BillingEventData,
}

#[derive(Debug, Deserialize)]
pub struct BillingEventData {
    pub user_id: UserId,
}

/// Returns whether the event changed anything
pub fn apply_billing_event(store: &Store, event: &BillingEvent) -> Result<bool, AppError> {
    if event.event != USER_UPGRADED {
        tracing::debug!(event = %event.event, "Ignoring billing event");
        return Ok(false);
    }

    let user_id = event.data.user_id;
    store.transact(|tx| tx.document_mut().promote_user(user_id).map(|_| ()))?;

    tracing::info!(user_id = user_id, "User promoted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::register_user;

    fn event(name: &str, user_id: UserId) -> BillingEvent {
        BillingEvent {
            event: name.to_string(),
            data: BillingEventData { user_id },
        }
    }

    #[test]
    fn test_upgrade_promotes_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("database.json"), false).unwrap();
        let alice = register_user(&store, "alice@x.com", "secret123").unwrap();

        assert!(apply_billing_event(&store, &event(USER_UPGRADED, alice.id)).unwrap());

        assert!(store.load().unwrap().user(alice.id).unwrap().is_promoted);
        let doc = store.load().unwrap();
        assert!(doc.user_by_email("alice@x.com").unwrap().is_promoted);
    }

    #[test]
    fn test_upgrade_of_unknown_user_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("database.json"), false).unwrap();

        assert!(matches!(
            apply_billing_event(&store, &event(USER_UPGRADED, 7)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_other_events_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("database.json"), false).unwrap();

        assert!(!apply_billing_event(&store, &event("user.downgraded", 7)).unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_event_deserializes_from_webhook_body() {
        let body = r#"{"event":"user.upgraded","data":{"user_id":3}}"#;
        let parsed: BillingEvent = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.event, USER_UPGRADED);
        assert_eq!(parsed.data.user_id, 3);
    }
}
