//! Routing of follow-up messages to flows waiting on an operator reply

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::domain::entities::Message;

type Key = (String, String);

/// Lets a flow await the next message a given user sends in a given chat.
/// A delivered follow-up bypasses normal command dispatch.
#[derive(Default)]
pub struct FollowUpRouter {
    waiting: Mutex<HashMap<Key, oneshot::Sender<Message>>>,
}

impl FollowUpRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the next message from `user_id` in `chat_id`. A newer
    /// subscription for the same pair supersedes the older one, whose
    /// receiver then resolves to an error.
    pub fn subscribe(&self, chat_id: &str, user_id: &str) -> oneshot::Receiver<Message> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut waiting) = self.waiting.lock() {
            waiting.insert((chat_id.to_string(), user_id.to_string()), tx);
        }
        rx
    }

    /// Drop a pending subscription, e.g. after a timeout.
    pub fn cancel(&self, chat_id: &str, user_id: &str) {
        if let Ok(mut waiting) = self.waiting.lock() {
            waiting.remove(&(chat_id.to_string(), user_id.to_string()));
        }
    }

    /// Deliver `message` to a waiting flow if one matches its chat and
    /// sender. Returns true when the message was consumed.
    pub fn try_deliver(&self, message: &Message) -> bool {
        let Some(sender) = &message.sender else {
            return false;
        };
        let key = (message.chat_id.clone(), sender.id.clone());
        let tx = match self.waiting.lock() {
            Ok(mut waiting) => waiting.remove(&key),
            Err(_) => None,
        };
        match tx {
            Some(tx) => tx.send(message.clone()).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;

    fn msg(chat: &str, user: &str, text: &str) -> Message {
        Message::from_text(chat, text).with_sender(User::new(user))
    }

    #[tokio::test]
    async fn delivers_to_matching_waiter() {
        let router = FollowUpRouter::new();
        let rx = router.subscribe("chat", "alice");

        assert!(router.try_deliver(&msg("chat", "alice", "hello")));
        let received = rx.await.unwrap();
        assert_eq!(received.content.text(), Some("hello"));
    }

    #[tokio::test]
    async fn ignores_other_users_and_chats() {
        let router = FollowUpRouter::new();
        let _rx = router.subscribe("chat", "alice");

        assert!(!router.try_deliver(&msg("chat", "bob", "hello")));
        assert!(!router.try_deliver(&msg("other", "alice", "hello")));
        assert!(!router.try_deliver(&Message::from_text("chat", "no sender")));
    }

    #[tokio::test]
    async fn cancel_removes_subscription() {
        let router = FollowUpRouter::new();
        let rx = router.subscribe("chat", "alice");
        router.cancel("chat", "alice");

        assert!(!router.try_deliver(&msg("chat", "alice", "hello")));
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn newer_subscription_supersedes_older() {
        let router = FollowUpRouter::new();
        let old = router.subscribe("chat", "alice");
        let new = router.subscribe("chat", "alice");

        assert!(router.try_deliver(&msg("chat", "alice", "hello")));
        assert!(old.await.is_err());
        assert_eq!(new.await.unwrap().content.text(), Some("hello"));
    }
}
