pub mod friendships;
pub mod posts;
pub mod travels;
pub mod users;

pub use friendships::{FriendshipRow, FriendshipStatus, FriendshipWithFriendRow};
pub use posts::{FeedPostRow, PostRow};
pub use travels::TravelRow;
pub use users::UsersRow;
