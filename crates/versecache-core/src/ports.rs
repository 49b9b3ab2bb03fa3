//! Capability ports for device feedback.
//!
//! The surrounding app wraps haptics and notifications in process-wide
//! services; here they are injected trait objects so the stores can run
//! headless (tests, CLI). All methods default to no-ops.

/// Haptic feedback on user-visible outcomes.
pub trait HapticPort: Send + Sync {
    /// A completion was persisted successfully.
    fn success(&self) {}

    /// A user action failed and will surface as an error.
    fn error(&self) {}
}

/// User-facing notifications (e.g. streak milestones).
pub trait NotificationPort: Send + Sync {
    fn notify(&self, _title: &str, _body: &str) {}
}

/// Haptics for environments without a device.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticPort for NoopHaptics {}

/// Notifications for environments without a notification runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifications;

impl NotificationPort for NoopNotifications {}
