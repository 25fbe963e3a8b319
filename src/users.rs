use log::{debug, info};
use serde::Deserialize;

use crate::api::{RestApi, ADMIN_USERS_PATH};
use crate::error::ImportError;
use crate::models::UserId;

#[derive(Debug, Deserialize)]
struct UserListing {
    #[serde(default)]
    users: Vec<AdminUser>,
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Finds the account whose email matches exactly, via the admin user listing.
pub fn resolve_user_id(api: &dyn RestApi, email: &str) -> Result<UserId, ImportError> {
    if email.trim().is_empty() {
        return Err(ImportError::EmptyEmail);
    }

    let response = api.get(ADMIN_USERS_PATH)?;
    if !response.is_success() {
        return Err(ImportError::Lookup {
            status: response.status,
            body: response.body,
        });
    }

    let listing: UserListing = serde_json::from_str(&response.body)?;
    debug!("admin listing returned {} users", listing.users.len());

    let user = listing
        .users
        .into_iter()
        .find(|user| user.email.as_deref() == Some(email))
        .ok_or_else(|| ImportError::UserNotFound(email.to_string()))?;

    info!("resolved {} to {}", email, user.id);
    Ok(UserId::new(user.id))
}
