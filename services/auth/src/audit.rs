//! Append-only audit trail
//!
//! Every successful state transition emits exactly one structured event on
//! the dedicated `audit` tracing target. The subscriber owns transport and
//! timestamps; emission never blocks the request path.

use tracing::info;
use uuid::Uuid;

/// Audit event kinds, one per successful state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    UserRegistered { user_id: Uuid },
    EmailVerified { user_id: Uuid },
    OtpIssued { user_id: Uuid },
    LoginSucceeded { user_id: Uuid },
    PasswordResetRequested { user_id: Uuid },
    PasswordReset { user_id: Uuid },
    ProfileAccessed { user_id: Uuid },
}

impl AuditEvent {
    /// Stable event name recorded in the trail
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::UserRegistered { .. } => "user_registered",
            AuditEvent::EmailVerified { .. } => "email_verified",
            AuditEvent::OtpIssued { .. } => "otp_issued",
            AuditEvent::LoginSucceeded { .. } => "login_succeeded",
            AuditEvent::PasswordResetRequested { .. } => "password_reset_requested",
            AuditEvent::PasswordReset { .. } => "password_reset",
            AuditEvent::ProfileAccessed { .. } => "profile_accessed",
        }
    }

    /// The user the event concerns
    pub fn user_id(&self) -> Uuid {
        match self {
            AuditEvent::UserRegistered { user_id }
            | AuditEvent::EmailVerified { user_id }
            | AuditEvent::OtpIssued { user_id }
            | AuditEvent::LoginSucceeded { user_id }
            | AuditEvent::PasswordResetRequested { user_id }
            | AuditEvent::PasswordReset { user_id }
            | AuditEvent::ProfileAccessed { user_id } => *user_id,
        }
    }
}

/// Sink for audit events
#[derive(Clone, Default)]
pub struct AuditLog;

impl AuditLog {
    pub fn new() -> Self {
        AuditLog
    }

    /// Record one event to the trail
    pub fn record(&self, event: AuditEvent) {
        info!(
            target: "audit",
            event = event.name(),
            user_id = %event.user_id(),
            "audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_stable() {
        let user_id = Uuid::new_v4();
        let cases = [
            (AuditEvent::UserRegistered { user_id }, "user_registered"),
            (AuditEvent::EmailVerified { user_id }, "email_verified"),
            (AuditEvent::OtpIssued { user_id }, "otp_issued"),
            (AuditEvent::LoginSucceeded { user_id }, "login_succeeded"),
            (
                AuditEvent::PasswordResetRequested { user_id },
                "password_reset_requested",
            ),
            (AuditEvent::PasswordReset { user_id }, "password_reset"),
            (AuditEvent::ProfileAccessed { user_id }, "profile_accessed"),
        ];

        for (event, name) in cases {
            assert_eq!(event.name(), name);
            assert_eq!(event.user_id(), user_id);
        }
    }
}
