//! Business logic services.
//!
//! Leaf-first: [`credentials`] and [`tokens`] establish identity,
//! [`policy`] decides access, [`incidents`] and [`attachments`] own the
//! records, and [`facade`] composes them for the HTTP layer.

pub mod attachments;
pub mod credentials;
pub mod facade;
pub mod incidents;
pub mod policy;
pub mod reconcile;
pub mod tokens;

use chrono::{DateTime, SubsecRound, Utc};

pub use attachments::{AttachmentLedger, UploadPayload};
pub use credentials::CredentialStore;
pub use facade::OccurrenceService;
pub use incidents::IncidentRegistry;
pub use policy::Operation;
pub use reconcile::start_reconcile_task;
pub use tokens::TokenService;

/// Current time at the precision the database keeps.
pub(crate) fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly later than `prev`, for `updated_at` refreshes.
pub(crate) fn advance_past(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > prev {
        now
    } else {
        prev + chrono::Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_past_is_strict() {
        let future = now_micros() + chrono::Duration::seconds(60);
        assert!(advance_past(future) > future);

        let past = now_micros() - chrono::Duration::seconds(60);
        assert!(advance_past(past) > past);
    }

    #[test]
    fn test_now_micros_has_no_nanos() {
        assert_eq!(now_micros().timestamp_subsec_nanos() % 1_000, 0);
    }
}
