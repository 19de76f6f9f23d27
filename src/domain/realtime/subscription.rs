use serde_json::{json, Value};

use crate::domain::foundation::{ConversationId, MessageId};

/// Something the client can ask the server to push updates for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    Conversation(ConversationId),
    MessageProcessing(MessageId),
}

impl Subscription {
    /// Wire name of the subscription kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Subscription::Conversation(_) => "conversation",
            Subscription::MessageProcessing(_) => "message_processing",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Subscription::Conversation(id) => id.as_str(),
            Subscription::MessageProcessing(id) => id.as_str(),
        }
    }

    /// `data` of a `subscribe` frame.
    pub fn subscribe_data(&self) -> Value {
        match self {
            Subscription::Conversation(id) => {
                json!({"type": self.kind(), "conversationId": id.as_str()})
            }
            Subscription::MessageProcessing(id) => {
                json!({"type": self.kind(), "messageId": id.as_str()})
            }
        }
    }

    /// `data` of an `unsubscribe` frame.
    pub fn unsubscribe_data(&self) -> Value {
        json!({"type": self.kind(), "id": self.id()})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_subscription_payloads() {
        let sub = Subscription::Conversation(ConversationId::new("c1").unwrap());
        assert_eq!(
            sub.subscribe_data(),
            json!({"type": "conversation", "conversationId": "c1"})
        );
        assert_eq!(sub.unsubscribe_data(), json!({"type": "conversation", "id": "c1"}));
    }

    #[test]
    fn message_subscription_payloads() {
        let sub = Subscription::MessageProcessing(MessageId::new("m1").unwrap());
        assert_eq!(
            sub.subscribe_data(),
            json!({"type": "message_processing", "messageId": "m1"})
        );
        assert_eq!(sub.unsubscribe_data()["id"], "m1");
    }
}
