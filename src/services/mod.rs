pub mod access_service;
pub mod friendship_service;
pub mod pagination;
pub mod pair_locks;
pub mod post_service;
pub mod projection;
pub mod travel_service;
pub mod user_service;
pub mod validation;
