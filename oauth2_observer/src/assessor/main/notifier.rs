use async_trait::async_trait;
use tokio::sync::mpsc;

/// Where notifications for the user end up.
///
/// Delivery is fire-and-forget: failures stay inside the notifier and never
/// reach flow processing.
#[async_trait]
pub trait UserNotifier: Send + Sync + 'static {
    async fn send_message(&self, title: &str, body: &str);
}

/// Reports notifications as `warn` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl UserNotifier for TracingNotifier {
    async fn send_message(&self, title: &str, body: &str) {
        tracing::warn!(title, body, "OAuth client vulnerability");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub title: String,
    pub body: String,
}

/// Forwards notifications into a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<DeliveredMessage>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeliveredMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl UserNotifier for ChannelNotifier {
    async fn send_message(&self, title: &str, body: &str) {
        let message = DeliveredMessage {
            title: title.to_string(),
            body: body.to_string(),
        };

        if self.sender.send(message).is_err() {
            tracing::warn!(title, "Notification receiver dropped, message discarded");
        }
    }
}
