//! Authorisation helpers used by HTTP handlers.
//!
//! The session proves who the caller is; the account service decides what
//! they may do. Handlers call [`require_admin`] before any catalogue write or
//! tap change.

use crate::domain::{User, UserId};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the session user and require the admin role.
///
/// Anonymous callers get `401`; authenticated non-admins get `403`.
pub async fn require_admin(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    state.accounts.require_admin(user_id).await
}

/// The session user id, if the caller is logged in as an admin.
///
/// Used where admin rights widen what a request may do without being
/// required for it.
pub async fn admin_id(state: &HttpState, session: &SessionContext) -> ApiResult<Option<UserId>> {
    match session.user_id()? {
        Some(user_id) => Ok(state
            .accounts
            .require_admin(user_id)
            .await
            .ok()
            .map(|user| user.id)),
        None => Ok(None),
    }
}
