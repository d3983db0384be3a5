//! Public shapes of stored records.
//!
//! Every view lists its fields explicitly, so a column added to a row struct
//! never leaks into a response by accident.

use serde::Serialize;

use crate::models::{
    FeedPostRow, FriendshipRow, FriendshipStatus, FriendshipWithFriendRow, PostRow, TravelRow,
    UsersRow,
};

/// What a user sees of their own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub bio: String,
}

/// What anyone else sees of a user: no contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublicView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// One side of a friendship as seen by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipView {
    pub id: String,
    pub status: FriendshipStatus,
    pub user_id: String,
    pub friend: UserPublicView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub comrades_count: i64,
    pub start_at: String,
    pub end_at: String,
    pub author_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub description: String,
    pub created_at: String,
    pub author_id: String,
    pub travel_id: String,
}

/// A post from someone's feed, carrying its travel and public author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostView {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub description: String,
    pub created_at: String,
    pub travel: TravelView,
    pub user: UserPublicView,
}

pub fn user_self(row: &UsersRow) -> UserView {
    UserView {
        id: row.id.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        username: row.username.clone(),
        email: row.email.clone(),
        bio: row.bio.clone(),
    }
}

pub fn user_public(row: &UsersRow) -> UserPublicView {
    UserPublicView {
        id: row.id.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        username: row.username.clone(),
    }
}

/// Replaces the raw owner/target references with `userId` plus the public
/// view of the counterpart.
pub fn friendship(record: &FriendshipRow, friend: &UsersRow) -> FriendshipView {
    FriendshipView {
        id: record.id.clone(),
        status: record.status,
        user_id: record.owner_id.clone(),
        friend: user_public(friend),
    }
}

pub fn friendship_listed(row: &FriendshipWithFriendRow) -> FriendshipView {
    FriendshipView {
        id: row.id.clone(),
        status: row.status,
        user_id: row.owner_id.clone(),
        friend: UserPublicView {
            id: row.target_id.clone(),
            first_name: row.friend_first_name.clone(),
            last_name: row.friend_last_name.clone(),
            username: row.friend_username.clone(),
        },
    }
}

pub fn travel(row: &TravelRow) -> TravelView {
    TravelView {
        id: row.id.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        destination: row.destination.clone(),
        comrades_count: row.comrades_count,
        start_at: row.start_at.clone(),
        end_at: row.end_at.clone(),
        author_id: row.user_id.clone(),
    }
}

pub fn post(row: &PostRow) -> PostView {
    PostView {
        id: row.id.clone(),
        title: row.title.clone(),
        destination: row.destination.clone(),
        description: row.description.clone(),
        created_at: row.created_at.clone(),
        author_id: row.user_id.clone(),
        travel_id: row.travel_id.clone(),
    }
}

pub fn feed_post(row: &FeedPostRow) -> FeedPostView {
    FeedPostView {
        id: row.id.clone(),
        title: row.title.clone(),
        destination: row.destination.clone(),
        description: row.description.clone(),
        created_at: row.created_at.clone(),
        travel: TravelView {
            id: row.travel_id.clone(),
            title: row.travel_title.clone(),
            description: row.travel_description.clone(),
            destination: row.travel_destination.clone(),
            comrades_count: row.travel_comrades_count,
            start_at: row.travel_start_at.clone(),
            end_at: row.travel_end_at.clone(),
            author_id: row.author_id.clone(),
        },
        user: UserPublicView {
            id: row.author_id.clone(),
            first_name: row.author_first_name.clone(),
            last_name: row.author_last_name.clone(),
            username: row.author_username.clone(),
        },
    }
}
