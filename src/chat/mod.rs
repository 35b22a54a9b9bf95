//! Chat client operations
//!
//! Identity, channel membership, message exchange and history, all
//! implemented as thin orchestrations of single store operations. Soft
//! failures (no identity, unknown user, unsubscribed channel) are typed
//! outcomes rendered by the caller; only store and serialization failures
//! propagate as errors.

mod session;

pub use session::{Session, UserProfile};

use crate::clock::Clock;
use crate::protocol::PushKind;
use crate::store::Store;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Set of every username that has ever identified.
pub const IDENTIFIED_USERS_KEY: &str = "identified_users";

/// Key of the profile hash for `username`.
pub fn user_key(username: &str) -> String {
    format!("user:{}", username)
}

/// Key of the outbound-message history list for `username`.
pub fn history_key(username: &str) -> String {
    format!("chat_history:{}", username)
}

/// The wire envelope published on a channel:
/// `{"from": <username-or-null>, "message": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub from: Option<String>,
    pub message: String,
}

/// A message surfaced by the read loop. The channel comes from the push
/// frame's own metadata, not from the caller's request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub channel: String,
    pub from: Option<String>,
    pub message: String,
}

/// Outcome of `switch_user`.
#[derive(Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Active user retargeted; `previous` is the identity switched away from.
    Switched { previous: Option<String> },

    /// No profile stored under that username; session unchanged.
    UnknownUser,
}

/// Outcome of `whoami`.
#[derive(Debug, PartialEq, Eq)]
pub enum WhoAmIOutcome {
    Profile(UserProfile),

    /// No active user in this session.
    NotIdentified,

    /// An active user is set but the store has no profile hash for it.
    MissingProfile,
}

/// Outcome of `join`.
#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadySubscribed,
}

/// Outcome of `leave`.
#[derive(Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    NotSubscribed,
}

/// Outcome of `send`. Sending never soft-fails: without an identity the
/// envelope goes out with a null sender and no history is recorded.
#[derive(Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { anonymous: bool },
}

/// Outcome of `read_channel`.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The poll window elapsed; `delivered` messages were surfaced.
    Completed { delivered: usize },

    /// The requested channel is not subscribed; nothing was polled.
    NotSubscribed,
}

/// The chat client: a store handle, the process session, and the clock
/// driving the read loop's deadline.
pub struct ChatClient<S, C> {
    store: S,
    session: Session,
    clock: C,
    read_deadline: Duration,
    poll_interval: Duration,
}

impl<S: Store, C: Clock> ChatClient<S, C> {
    pub fn new(store: S, clock: C, config: &crate::config::Config) -> Self {
        ChatClient {
            store,
            session: Session::new(),
            clock,
            read_deadline: config.read_timeout,
            poll_interval: config.poll_interval,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Simultaneous mutable access to store and session, for the command
    /// dispatcher's context.
    pub fn parts(&mut self) -> (&mut S, &mut Session) {
        (&mut self.store, &mut self.session)
    }

    /// Store the profile, record the username among identified users, and
    /// make it this session's active user. Overwrites any previous profile
    /// under the same username without a collision check: last writer wins.
    pub async fn identify(&mut self, profile: UserProfile) -> Result<()> {
        self.store
            .hset(&user_key(&profile.username), &profile.fields())
            .await?;
        self.store
            .sadd(IDENTIFIED_USERS_KEY, &profile.username)
            .await?;
        self.session.set_active_user(profile.username);
        Ok(())
    }

    /// Retarget the session to an already-identified user.
    pub async fn switch_user(&mut self, username: &str) -> Result<SwitchOutcome> {
        let fields = self.store.hgetall(&user_key(username)).await?;
        if fields.is_empty() {
            return Ok(SwitchOutcome::UnknownUser);
        }

        let previous = self.session.set_active_user(username.to_string());
        Ok(SwitchOutcome::Switched { previous })
    }

    /// Fetch the active user's stored profile.
    pub async fn whoami(&mut self) -> Result<WhoAmIOutcome> {
        fetch_whoami(&mut self.store, &self.session).await
    }

    /// Every username that has ever identified, sorted for stable display.
    pub async fn identified_users(&mut self) -> Result<Vec<String>> {
        let mut users = self.store.smembers(IDENTIFIED_USERS_KEY).await?;
        users.sort();
        Ok(users)
    }

    /// Subscribe to a channel. Idempotent with a notice: joining a channel
    /// twice leaves both the store and the session untouched.
    pub async fn join(&mut self, channel: &str) -> Result<JoinOutcome> {
        if self.session.is_subscribed(channel) {
            return Ok(JoinOutcome::AlreadySubscribed);
        }

        // Store first: if the subscribe fails the session stays in sync.
        self.store.subscribe(channel).await?;
        self.session.add_channel(channel);
        Ok(JoinOutcome::Joined)
    }

    /// Unsubscribe from a channel.
    pub async fn leave(&mut self, channel: &str) -> Result<LeaveOutcome> {
        if !self.session.is_subscribed(channel) {
            return Ok(LeaveOutcome::NotSubscribed);
        }

        self.store.unsubscribe(channel).await?;
        self.session.remove_channel(channel);
        Ok(LeaveOutcome::Left)
    }

    /// Subscribed channels, sorted for stable display.
    pub fn subscriptions(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.session.channels().iter().cloned().collect();
        channels.sort();
        channels
    }

    /// Publish a message to a channel and record it in the sender's
    /// history. Without an active user the envelope carries a null sender
    /// and no history entry is written.
    pub async fn send(&mut self, channel: &str, message: &str) -> Result<SendOutcome> {
        let from = self.session.active_user().map(str::to_string);
        let envelope = Envelope {
            from: from.clone(),
            message: message.to_string(),
        };
        let payload = serde_json::to_vec(&envelope)?;
        self.store.publish(channel, &payload).await?;

        match from {
            Some(username) => {
                self.store.lpush(&history_key(&username), message).await?;
                Ok(SendOutcome::Sent { anonymous: false })
            }
            None => Ok(SendOutcome::Sent { anonymous: true }),
        }
    }

    /// A user's outbound history, newest first.
    pub async fn chat_history(&mut self, username: &str) -> Result<Vec<String>> {
        Ok(self.store.lrange(&history_key(username), 0, -1).await?)
    }

    /// Poll for messages on `channel` until the configured deadline
    /// elapses, invoking `on_message` for each one delivered.
    ///
    /// The deadline is total elapsed time from entry; receiving a message
    /// does not extend it. Between empty polls the loop yields for the
    /// configured interval. Frames for other channels and subscription
    /// confirmations are skipped. An empty window is not an error.
    pub async fn read_channel(
        &mut self,
        channel: &str,
        mut on_message: impl FnMut(ChannelEvent),
    ) -> Result<ReadOutcome> {
        if !self.session.is_subscribed(channel) {
            return Ok(ReadOutcome::NotSubscribed);
        }

        let started = self.clock.now();
        let mut delivered = 0;

        loop {
            if self.clock.now().duration_since(started) >= self.read_deadline {
                break;
            }

            match self.store.poll_message().await? {
                Some(push) if push.kind == PushKind::Message => {
                    if push.channel == channel {
                        let envelope: Envelope = serde_json::from_slice(&push.payload)?;
                        delivered += 1;
                        on_message(ChannelEvent {
                            channel: push.channel,
                            from: envelope.from,
                            message: envelope.message,
                        });
                    } else {
                        debug!(channel = %push.channel, "skipping message for another channel");
                    }
                }
                Some(push) => {
                    debug!(kind = ?push.kind, channel = %push.channel, "skipping confirmation frame");
                }
                None => self.clock.yield_for(self.poll_interval).await,
            }
        }

        Ok(ReadOutcome::Completed { delivered })
    }
}

/// Shared by [`ChatClient::whoami`] and the `!whoami` command: resolve the
/// session's active identity against the store. Never touches the store
/// when no user is identified.
pub(crate) async fn fetch_whoami<S: Store + ?Sized>(
    store: &mut S,
    session: &Session,
) -> Result<WhoAmIOutcome> {
    let username = match session.active_user() {
        Some(username) => username.to_string(),
        None => return Ok(WhoAmIOutcome::NotIdentified),
    };

    let fields = store.hgetall(&user_key(&username)).await?;
    if fields.is_empty() {
        return Ok(WhoAmIOutcome::MissingProfile);
    }
    Ok(WhoAmIOutcome::Profile(UserProfile::from_fields(&fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::store::MemoryStore;

    fn test_config() -> Config {
        Config {
            read_timeout: Duration::from_secs(3),
            poll_interval: Duration::from_secs(1),
            ..Config::default()
        }
    }

    fn client() -> ChatClient<MemoryStore, ManualClock> {
        ChatClient::new(MemoryStore::new(), ManualClock::new(), &test_config())
    }

    fn alice() -> UserProfile {
        UserProfile {
            username: "alice".to_string(),
            age: "30".to_string(),
            gender: "f".to_string(),
            location: "Chicago".to_string(),
        }
    }

    #[tokio::test]
    async fn test_identify_then_whoami_roundtrips_profile() {
        let mut client = client();
        client.identify(alice()).await.unwrap();

        assert_eq!(client.session().active_user(), Some("alice"));
        assert_eq!(
            client.whoami().await.unwrap(),
            WhoAmIOutcome::Profile(alice())
        );
    }

    #[tokio::test]
    async fn test_identify_overwrites_last_writer_wins() {
        let mut client = client();
        client.identify(alice()).await.unwrap();

        let mut moved = alice();
        moved.location = "Paris".to_string();
        client.identify(moved.clone()).await.unwrap();

        assert_eq!(
            client.whoami().await.unwrap(),
            WhoAmIOutcome::Profile(moved)
        );
        assert_eq!(
            client.identified_users().await.unwrap(),
            vec!["alice".to_string()]
        );
    }

    #[tokio::test]
    async fn test_whoami_without_identity() {
        let mut client = client();
        assert_eq!(client.whoami().await.unwrap(), WhoAmIOutcome::NotIdentified);
    }

    #[tokio::test]
    async fn test_switch_user_unknown_leaves_session_unchanged() {
        let mut client = client();
        client.identify(alice()).await.unwrap();

        assert_eq!(
            client.switch_user("ghost").await.unwrap(),
            SwitchOutcome::UnknownUser
        );
        assert_eq!(client.session().active_user(), Some("alice"));
    }

    #[tokio::test]
    async fn test_switch_user_reports_previous_identity() {
        let mut client = client();
        client.identify(alice()).await.unwrap();
        let mut bob = alice();
        bob.username = "bob".to_string();
        client.identify(bob).await.unwrap();

        assert_eq!(
            client.switch_user("alice").await.unwrap(),
            SwitchOutcome::Switched {
                previous: Some("bob".to_string())
            }
        );
        assert_eq!(client.session().active_user(), Some("alice"));
    }

    #[tokio::test]
    async fn test_join_is_idempotent_with_notice() {
        let mut client = client();
        assert_eq!(client.join("general").await.unwrap(), JoinOutcome::Joined);
        assert_eq!(
            client.join("general").await.unwrap(),
            JoinOutcome::AlreadySubscribed
        );
        assert_eq!(client.subscriptions(), vec!["general".to_string()]);
    }

    #[tokio::test]
    async fn test_leave_unsubscribed_is_a_notice() {
        let mut client = client();
        assert_eq!(
            client.leave("general").await.unwrap(),
            LeaveOutcome::NotSubscribed
        );

        client.join("general").await.unwrap();
        assert_eq!(client.leave("general").await.unwrap(), LeaveOutcome::Left);
        assert!(client.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_send_records_history_newest_first() {
        let mut client = client();
        client.identify(alice()).await.unwrap();

        client.send("general", "hi").await.unwrap();
        client.send("general", "bye").await.unwrap();

        let history = client.chat_history("alice").await.unwrap();
        assert_eq!(history, vec!["bye".to_string(), "hi".to_string()]);
    }

    #[tokio::test]
    async fn test_anonymous_send_skips_history() {
        let mut client = client();
        // Subscribe so the publish is observable.
        client.join("general").await.unwrap();

        assert_eq!(
            client.send("general", "hi").await.unwrap(),
            SendOutcome::Sent { anonymous: true }
        );

        // The envelope goes out with a null sender.
        let store = client.store_mut();
        let ack = store.poll_message().await.unwrap().unwrap();
        assert_eq!(ack.kind, PushKind::Subscribe);
        let msg = store.poll_message().await.unwrap().unwrap();
        assert_eq!(&msg.payload[..], br#"{"from":null,"message":"hi"}"#);
    }

    #[tokio::test]
    async fn test_read_unsubscribed_returns_immediately() {
        let mut client = client();
        let before = client.clock.now();

        let outcome = client
            .read_channel("general", |_| panic!("no messages expected"))
            .await
            .unwrap();

        assert_eq!(outcome, ReadOutcome::NotSubscribed);
        // No polling, no yielding: the clock never moved.
        assert_eq!(client.clock.now(), before);
    }

    #[tokio::test]
    async fn test_read_delivers_own_channel_and_skips_acks() {
        let mut client = client();
        client.identify(alice()).await.unwrap();
        client.join("general").await.unwrap();
        client.send("general", "hello there").await.unwrap();

        let mut events = Vec::new();
        let outcome = client
            .read_channel("general", |event| events.push(event))
            .await
            .unwrap();

        assert_eq!(outcome, ReadOutcome::Completed { delivered: 1 });
        assert_eq!(
            events,
            vec![ChannelEvent {
                channel: "general".to_string(),
                from: Some("alice".to_string()),
                message: "hello there".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_read_filters_foreign_channels() {
        let mut client = client();
        client.identify(alice()).await.unwrap();
        client.join("general").await.unwrap();
        client.join("random").await.unwrap();
        client.send("random", "elsewhere").await.unwrap();
        client.send("general", "here").await.unwrap();

        let mut events = Vec::new();
        let outcome = client
            .read_channel("general", |event| events.push(event))
            .await
            .unwrap();

        assert_eq!(outcome, ReadOutcome::Completed { delivered: 1 });
        assert_eq!(events[0].message, "here");
    }

    #[tokio::test]
    async fn test_read_window_elapses_without_messages() {
        let mut client = client();
        client.join("quiet").await.unwrap();

        let before = client.clock.now();
        let outcome = client.read_channel("quiet", |_| {}).await.unwrap();

        assert_eq!(outcome, ReadOutcome::Completed { delivered: 0 });
        // The loop ran its full window: 3s deadline in 1s yields.
        assert!(client.clock.now().duration_since(before) >= Duration::from_secs(3));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let named = Envelope {
            from: Some("alice".to_string()),
            message: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&named).unwrap(),
            r#"{"from":"alice","message":"hi"}"#
        );

        let anonymous = Envelope {
            from: None,
            message: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&anonymous).unwrap(),
            r#"{"from":null,"message":"hi"}"#
        );
    }
}
