//! The logged-in user, held in an explicit context that is created once at
//! startup and handed to whatever needs it.

use std::sync::{Arc, PoisonError, RwLock};

use mentorhub_core::models::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    /// Set when the user also offers sessions as an owner
    pub role: Option<Role>,
}

/// Shared handle to the current user. Clones see the same login state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Arc<RwLock<Option<CurrentUser>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: CurrentUser) -> Self {
        let context = Self::new();
        context.login(user);
        context
    }

    /// Replaces whoever was logged in before.
    pub fn login(&self, user: CurrentUser) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn logout(&self) -> Option<CurrentUser> {
        self.user.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn current(&self) -> Option<CurrentUser> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn require(&self) -> Result<CurrentUser, ClientError> {
        self.current().ok_or(ClientError::NotLoggedIn)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}
