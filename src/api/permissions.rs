//! HTTP side of the permission gate.

use axum::http::Uri;
use tracing::warn;

use super::ApiError;
use crate::domain::permissions::{self, Access};
use crate::domain::{Account, Permission, Principal};

/// Lets the request through only if `principal` holds `permission`.
///
/// Anonymous principals are sent to `login_url` with the original path and
/// query as `next`, without evaluating the permission. Accounts lacking the
/// permission get a 403.
pub fn require<'a>(
    principal: &'a Principal,
    permission: Permission,
    uri: &Uri,
    login_url: &str,
) -> Result<&'a Account, ApiError> {
    let Some(account) = principal.account() else {
        return Err(ApiError::login_required(login_url, original_target(uri)));
    };

    match permissions::check(principal, permission) {
        Access::Allowed => Ok(account),
        Access::Denied => {
            warn!(
                user_id = account.id,
                username = %account.username,
                permission = %permission,
                "Permission denied"
            );
            Err(ApiError::forbidden())
        }
    }
}

/// Any authenticated account.
pub fn require_login<'a>(
    principal: &'a Principal,
    uri: &Uri,
    login_url: &str,
) -> Result<&'a Account, ApiError> {
    principal
        .account()
        .ok_or_else(|| ApiError::login_required(login_url, original_target(uri)))
}

/// Active staff accounts only.
pub fn require_staff<'a>(
    principal: &'a Principal,
    uri: &Uri,
    login_url: &str,
) -> Result<&'a Account, ApiError> {
    let account = require_login(principal, uri, login_url)?;
    if account.is_active && account.is_staff {
        Ok(account)
    } else {
        warn!(user_id = account.id, "Staff access denied");
        Err(ApiError::forbidden())
    }
}

fn original_target(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}
