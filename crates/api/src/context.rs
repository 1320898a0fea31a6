use mesto_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the authentication (or fixed-identity) middleware; every protected handler
/// reads it from request extensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
}

impl CurrentUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
