use std::fmt;

use crate::entities::user;
use crate::services::error::{ServiceError, ServiceResult};

/// The authenticated owner on whose behalf a storage operation runs.
///
/// Every mutating or per-owner listing query takes one of these, so an owner
/// predicate can't be forgotten at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(i32);

impl OwnerId {
    /// Turn a possibly-missing identity into an owner.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthenticated`] when `identity` is `None`.
    pub fn require(identity: Option<i32>) -> ServiceResult<Self> {
        match identity {
            Some(id) => Ok(Self(id)),
            None => Err(ServiceError::Unauthenticated),
        }
    }

    #[must_use]
    pub const fn from_user(user: &user::Model) -> Self {
        Self(user.id)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
