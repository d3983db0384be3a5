use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// State of one directed half of a friendship.
///
/// The inviter's half starts as `Waiting`, the invitee's half as `Invitation`.
/// Both halves move to `Accepted` together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Waiting,
    Invitation,
    Accepted,
}

impl FriendshipStatus {
    pub const ALL: [FriendshipStatus; 3] = [
        FriendshipStatus::Accepted,
        FriendshipStatus::Waiting,
        FriendshipStatus::Invitation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Waiting => "waiting",
            FriendshipStatus::Invitation => "invitation",
            FriendshipStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" => Ok(FriendshipStatus::Waiting),
            "invitation" => Ok(FriendshipStatus::Invitation),
            "accepted" => Ok(FriendshipStatus::Accepted),
            other => Err(format!("unknown friendship status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FriendshipRow {
    pub id: String,
    pub owner_id: String,
    pub target_id: String,
    pub status: FriendshipStatus,
}

/// A relationship record joined with the public fields of its target user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FriendshipWithFriendRow {
    pub id: String,
    pub owner_id: String,
    pub target_id: String,
    pub status: FriendshipStatus,
    pub friend_first_name: String,
    pub friend_last_name: String,
    pub friend_username: String,
}
