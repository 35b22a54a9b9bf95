//! Per-process session state
//!
//! The session records who the running process is identified as and which
//! channels it is subscribed to. It is owned by the chat client and
//! threaded explicitly into every operation that needs it; nothing here
//! is persisted, the state dies with the process.

use std::collections::HashSet;

/// The active identity and subscription set of this process.
#[derive(Debug, Default)]
pub struct Session {
    /// Currently identified user, if any
    active_user: Option<String>,

    /// Channels with an active store subscription.
    ///
    /// Invariant: a channel is in this set iff the store holds an active
    /// subscription for it. `join`/`leave` update both sides or neither.
    channels: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// The active username, if one has been identified.
    pub fn active_user(&self) -> Option<&str> {
        self.active_user.as_deref()
    }

    /// Retarget the active user, returning the previous identity.
    pub fn set_active_user(&mut self, username: String) -> Option<String> {
        self.active_user.replace(username)
    }

    /// Whether this process is subscribed to `channel`.
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    /// Record a subscription. True if it was new.
    pub fn add_channel(&mut self, channel: &str) -> bool {
        self.channels.insert(channel.to_string())
    }

    /// Drop a subscription. True if it existed.
    pub fn remove_channel(&mut self, channel: &str) -> bool {
        self.channels.remove(channel)
    }

    /// The subscribed channels.
    pub fn channels(&self) -> &HashSet<String> {
        &self.channels
    }
}

/// A user's stored profile. All fields are opaque strings; nothing is
/// validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub age: String,
    pub gender: String,
    pub location: String,
}

impl UserProfile {
    /// The field/value pairs stored in the `user:<username>` hash.
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.clone()),
            ("age".to_string(), self.age.clone()),
            ("gender".to_string(), self.gender.clone()),
            ("location".to_string(), self.location.clone()),
        ]
    }

    /// Rebuild a profile from stored hash pairs. Missing fields come back
    /// empty rather than failing; the store is the source of truth.
    pub fn from_fields(pairs: &[(String, String)]) -> Self {
        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        UserProfile {
            username: lookup("username"),
            age: lookup("age"),
            gender: lookup("gender"),
            location: lookup("location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tracks_channels() {
        let mut session = Session::new();
        assert!(!session.is_subscribed("general"));

        assert!(session.add_channel("general"));
        assert!(!session.add_channel("general"));
        assert!(session.is_subscribed("general"));

        assert!(session.remove_channel("general"));
        assert!(!session.remove_channel("general"));
        assert!(!session.is_subscribed("general"));
    }

    #[test]
    fn test_set_active_user_returns_previous() {
        let mut session = Session::new();
        assert_eq!(session.set_active_user("alice".to_string()), None);
        assert_eq!(
            session.set_active_user("bob".to_string()),
            Some("alice".to_string())
        );
        assert_eq!(session.active_user(), Some("bob"));
    }

    #[test]
    fn test_profile_field_roundtrip() {
        let profile = UserProfile {
            username: "alice".to_string(),
            age: "30".to_string(),
            gender: "f".to_string(),
            location: "Chicago".to_string(),
        };
        assert_eq!(UserProfile::from_fields(&profile.fields()), profile);
    }

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let pairs = vec![("username".to_string(), "bob".to_string())];
        let profile = UserProfile::from_fields(&pairs);
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.age, "");
        assert_eq!(profile.location, "");
    }
}
