//! Channel privileges and roles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of actions a token can permit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivilegeKind {
    /// Join the channel
    JoinChannel,
    /// Publish an audio stream
    PublishAudio,
    /// Publish a video stream
    PublishVideo,
    /// Publish a data stream
    PublishData,
}

impl PrivilegeKind {
    /// All kinds in wire-tag order
    pub const ALL: [PrivilegeKind; 4] = [
        PrivilegeKind::JoinChannel,
        PrivilegeKind::PublishAudio,
        PrivilegeKind::PublishVideo,
        PrivilegeKind::PublishData,
    ];

    /// Wire tag of this kind
    pub fn tag(self) -> u16 {
        match self {
            PrivilegeKind::JoinChannel => 1,
            PrivilegeKind::PublishAudio => 2,
            PrivilegeKind::PublishVideo => 3,
            PrivilegeKind::PublishData => 4,
        }
    }

    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(PrivilegeKind::JoinChannel),
            2 => Some(PrivilegeKind::PublishAudio),
            3 => Some(PrivilegeKind::PublishVideo),
            4 => Some(PrivilegeKind::PublishData),
            _ => None,
        }
    }
}

impl fmt::Display for PrivilegeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivilegeKind::JoinChannel => write!(f, "join_channel"),
            PrivilegeKind::PublishAudio => write!(f, "publish_audio"),
            PrivilegeKind::PublishVideo => write!(f, "publish_video"),
            PrivilegeKind::PublishData => write!(f, "publish_data"),
        }
    }
}

/// Role a client takes in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May join and publish audio, video and data
    Publisher,
    /// May only join
    #[default]
    Subscriber,
}

impl Role {
    /// Parse a role name. Accepts the numeric codes `1` (publisher) and
    /// `2` (subscriber) as well as the common aliases.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "publisher" | "host" | "1" => Some(Role::Publisher),
            "subscriber" | "attendee" | "audience" | "2" => Some(Role::Subscriber),
            _ => None,
        }
    }

    /// Role for a token service request: only the exact name `publisher`
    /// or an admin flag grants publishing, everything else subscribes.
    pub fn from_request(role: Option<&str>, is_admin: bool) -> Role {
        if is_admin || role == Some("publisher") {
            Role::Publisher
        } else {
            Role::Subscriber
        }
    }

    /// Privilege kinds unlocked by this role
    pub fn privileges(self) -> &'static [PrivilegeKind] {
        match self {
            Role::Publisher => &PrivilegeKind::ALL,
            Role::Subscriber => &[PrivilegeKind::JoinChannel],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => write!(f, "publisher"),
            Role::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// A single privilege: kind + expiry (unix seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Privilege {
    pub kind: PrivilegeKind,
    pub expires_at: u64,
}

impl Privilege {
    pub fn new(kind: PrivilegeKind, expires_at: u64) -> Self {
        Self { kind, expires_at }
    }

    /// Check if the privilege is still valid at `now`
    pub fn is_valid_at(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.expires_at)
    }
}

/// Privileges carried by a token, ordered by wire tag with no duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeSet {
    privileges: Vec<Privilege>,
}

impl PrivilegeSet {
    pub fn new() -> Self {
        Self { privileges: Vec::new() }
    }

    /// Build the privilege set for a role, every privilege sharing one expiry
    pub fn for_role(role: Role, expires_at: u64) -> Self {
        role.privileges()
            .iter()
            .map(|kind| Privilege::new(*kind, expires_at))
            .collect()
    }

    /// Add a privilege, replacing any existing entry of the same kind
    pub fn add(&mut self, privilege: Privilege) {
        match self
            .privileges
            .binary_search_by_key(&privilege.kind, |p| p.kind)
        {
            Ok(i) => self.privileges[i] = privilege,
            Err(i) => self.privileges.insert(i, privilege),
        }
    }

    pub fn get(&self, kind: PrivilegeKind) -> Option<&Privilege> {
        self.privileges.iter().find(|p| p.kind == kind)
    }

    /// Check if `kind` is present and unexpired at `now`
    pub fn allows(&self, kind: PrivilegeKind, now: u64) -> bool {
        self.get(kind).is_some_and(|p| p.is_valid_at(now))
    }

    pub fn privileges(&self) -> &[Privilege] {
        &self.privileges
    }

    pub fn kinds(&self) -> Vec<PrivilegeKind> {
        self.privileges.iter().map(|p| p.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<T: IntoIterator<Item = Privilege>>(iter: T) -> Self {
        let mut set = PrivilegeSet::new();
        for privilege in iter {
            set.add(privilege);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_privileges() {
        let set = PrivilegeSet::for_role(Role::Publisher, 1_000);
        assert_eq!(set.kinds(), PrivilegeKind::ALL.to_vec());
        assert!(set.privileges().iter().all(|p| p.expires_at == 1_000));
    }

    #[test]
    fn test_subscriber_privileges() {
        let set = PrivilegeSet::for_role(Role::Subscriber, 1_000);
        assert_eq!(set.kinds(), vec![PrivilegeKind::JoinChannel]);
        assert!(!set.allows(PrivilegeKind::PublishAudio, 0));
    }

    #[test]
    fn test_add_keeps_order_and_replaces() {
        let mut set = PrivilegeSet::new();
        set.add(Privilege::new(PrivilegeKind::PublishData, 10));
        set.add(Privilege::new(PrivilegeKind::JoinChannel, 10));
        set.add(Privilege::new(PrivilegeKind::PublishData, 20));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.kinds(),
            vec![PrivilegeKind::JoinChannel, PrivilegeKind::PublishData]
        );
        assert_eq!(set.get(PrivilegeKind::PublishData).unwrap().expires_at, 20);
    }

    #[test]
    fn test_allows_respects_expiry() {
        let set = PrivilegeSet::for_role(Role::Subscriber, 100);
        assert!(set.allows(PrivilegeKind::JoinChannel, 99));
        assert!(!set.allows(PrivilegeKind::JoinChannel, 100));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("publisher"), Some(Role::Publisher));
        assert_eq!(Role::parse("HOST"), Some(Role::Publisher));
        assert_eq!(Role::parse("1"), Some(Role::Publisher));
        assert_eq!(Role::parse("attendee"), Some(Role::Subscriber));
        assert_eq!(Role::parse(" subscriber "), Some(Role::Subscriber));
        assert_eq!(Role::parse("2"), Some(Role::Subscriber));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_role_from_request() {
        assert_eq!(Role::from_request(Some("publisher"), false), Role::Publisher);
        assert_eq!(Role::from_request(None, true), Role::Publisher);
        assert_eq!(Role::from_request(Some("owner"), true), Role::Publisher);

        for name in ["host", "owner", "Publisher", "1", "subscriber", ""] {
            assert_eq!(Role::from_request(Some(name), false), Role::Subscriber, "{}", name);
        }
        assert_eq!(Role::from_request(None, false), Role::Subscriber);
    }

    #[test]
    fn test_kind_tags() {
        for kind in PrivilegeKind::ALL {
            assert_eq!(PrivilegeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(PrivilegeKind::from_tag(0), None);
        assert_eq!(PrivilegeKind::from_tag(5), None);
    }
}
