use super::token::AuthToken;
use crate::user::UserProfile;

/// An authenticated backend session.
///
/// `id` identifies the session scope it was committed in; results of work
/// started under one session are discarded once a different session (or
/// none) is current.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: u64,
    token: AuthToken,
    /// Profile from the login handshake or the latest `/api/user/info`.
    /// `None` while a resumed session waits for its first profile fetch.
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(id: u64, token: AuthToken, user: Option<UserProfile>) -> Self {
        Self { id, token, user }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }
}
