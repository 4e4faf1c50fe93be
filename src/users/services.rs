use tracing::{error, info};

use super::{dto::UpdateUserRequest, repo_types::Account};
use crate::{
    auth::password::CredentialManager,
    error::{ApiError, StoreError},
    state::AppState,
};

/// Keeps a supplied value only if it has non-whitespace content.
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Overlays the non-empty profile fields of `req` onto `account`.
/// The password is handled separately since it needs a fresh salt.
pub fn merge_profile(mut account: Account, req: &mut UpdateUserRequest) -> Account {
    if let Some(v) = non_empty(req.first_name.take()) {
        account.first_name = v;
    }
    if let Some(v) = non_empty(req.last_name.take()) {
        account.last_name = v;
    }
    if let Some(v) = non_empty(req.email.take()) {
        account.email = v;
    }
    if let Some(v) = non_empty(req.phone_number.take()) {
        account.phone_number = Some(v);
    }
    account
}

pub async fn load_account(state: &AppState, id: i64) -> Result<Account, ApiError> {
    match state.accounts.find_by_id(id).await {
        Ok(Some(a)) => Ok(a),
        Ok(None) => Err(ApiError::NotFound("User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = id, "find_by_id failed");
            Err(ApiError::internal("Failed to load user"))
        }
    }
}

pub async fn update_account(
    state: &AppState,
    id: i64,
    mut req: UpdateUserRequest,
) -> Result<Account, ApiError> {
    let existing = load_account(state, id).await?;
    let mut account = merge_profile(existing, &mut req);

    if let Some(password) = req.password.take().filter(|p| !p.is_empty()) {
        let salt = CredentialManager::generate_salt();
        account.passhash = state
            .passwords
            .hash_password_blocking(password, salt.clone())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = id, "hash_password failed");
                ApiError::internal("Failed to hash password")
            })?;
        account.salt = salt;
    }

    match state.accounts.update(&account).await {
        Ok(()) => {}
        Err(StoreError::Conflict) => {
            return Err(ApiError::Conflict("Email already registered".into()))
        }
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = id, "update user failed");
            return Err(ApiError::internal("Failed to update user"));
        }
    }

    let updated = state
        .accounts
        .find_by_id(id)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| ApiError::internal("Failed to retrieve updated user"))?;

    info!(user_id = id, "user updated");
    Ok(updated)
}

pub async fn delete_account(state: &AppState, id: i64) -> Result<(), ApiError> {
    load_account(state, id).await?;

    match state.accounts.delete(id).await {
        Ok(()) => {
            info!(user_id = id, "user deleted");
            Ok(())
        }
        Err(StoreError::NotFound) => Err(ApiError::NotFound("User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = id, "delete user failed");
            Err(ApiError::internal("Failed to delete user"))
        }
    }
}
