//! Profile Entity

use super::user::UserSummary;

/// A user as seen by another (possibly anonymous) user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub image: String,
    pub following: bool,
}

impl Profile {
    pub fn new(user: &UserSummary, following: bool) -> Self {
        Self {
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following,
        }
    }
}
