use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::error::ErrorMessage;

/// Hook for hosts that present API errors (alerts, toasts) and refresh
/// state after successful calls. Both callbacks run on the calling task.
pub trait ApiObserver: Send + Sync {
    fn on_error(&self, error: &ErrorMessage);

    fn on_response(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEvent {
    Error(ErrorMessage),
    Response,
}

/// Forwards every callback into an unbounded channel.
pub struct ChannelObserver {
    sender: UnboundedSender<ApiEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, UnboundedReceiver<ApiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ApiEvent) {
        if self.sender.send(event).is_err() {
            debug!("API event dropped, receiver is gone");
        }
    }
}

impl ApiObserver for ChannelObserver {
    fn on_error(&self, error: &ErrorMessage) {
        self.send(ApiEvent::Error(error.clone()));
    }

    fn on_response(&self) {
        self.send(ApiEvent::Response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageCode;

    #[test]
    fn events_arrive_in_order() {
        let (observer, mut events) = ChannelObserver::new();

        observer.on_response();
        observer.on_error(&ErrorMessage::new(MessageCode::Forbidden));

        assert_eq!(events.try_recv().unwrap(), ApiEvent::Response);
        assert_eq!(
            events.try_recv().unwrap(),
            ApiEvent::Error(ErrorMessage::new(MessageCode::Forbidden))
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (observer, events) = ChannelObserver::new();
        drop(events);
        observer.on_response();
    }
}
