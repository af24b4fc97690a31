/// Failure notification collaborator. Fire-and-forget: implementations log
/// their own delivery problems and never fail the caller.
pub trait Notifier {
    fn notify_failure(&self, message: &str, recipient: &str, channel: &str);
}

/// Used when no delivery channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_failure(&self, message: &str, recipient: &str, channel: &str) {
        tracing::warn!(recipient, channel, "notification (no webhook configured): {message}");
    }
}
