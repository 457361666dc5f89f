//! Permission model and the capability check used by every gated route.
//!
//! A permission is an (action, resource) pair. Its qualified codename,
//! e.g. `moduletrack.change_pcbtype`, is what the account store records for
//! direct grants and group grants.

use std::fmt;
use std::str::FromStr;

use super::Principal;
use crate::constants::APP_LABEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::View, Self::Add, Self::Change, Self::Delete];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Add => "add",
            Self::Change => "change",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    PcbType,
}

impl Resource {
    #[must_use]
    pub const fn model_name(&self) -> &'static str {
        match self {
            Self::PcbType => "pcbtype",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub resource: Resource,
}

impl Permission {
    pub const VIEW_PCB_TYPE: Self = Self::new(Action::View, Resource::PcbType);
    pub const ADD_PCB_TYPE: Self = Self::new(Action::Add, Resource::PcbType);
    pub const CHANGE_PCB_TYPE: Self = Self::new(Action::Change, Resource::PcbType);
    pub const DELETE_PCB_TYPE: Self = Self::new(Action::Delete, Resource::PcbType);

    #[must_use]
    pub const fn new(action: Action, resource: Resource) -> Self {
        Self { action, resource }
    }

    /// Codename without the app label, e.g. `view_pcbtype`.
    #[must_use]
    pub fn codename(&self) -> String {
        format!("{}_{}", self.action.as_str(), self.resource.model_name())
    }

    /// Codename as stored, e.g. `moduletrack.view_pcbtype`.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{APP_LABEL}.{}", self.codename())
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    /// Accepts `view`, `view_pcbtype` and `moduletrack.view_pcbtype`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let unqualified = raw
            .strip_prefix(APP_LABEL)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(raw.as_str());

        let (action, model) = unqualified
            .split_once('_')
            .unwrap_or((unqualified, Resource::PcbType.model_name()));

        let action = Action::ALL
            .into_iter()
            .find(|a| a.as_str() == action)
            .ok_or_else(|| UnknownPermission(s.to_string()))?;

        if model != Resource::PcbType.model_name() {
            return Err(UnknownPermission(s.to_string()));
        }

        Ok(Self::new(action, Resource::PcbType))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

impl Access {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether `principal` may perform `permission`.
///
/// Anonymous principals are always denied; callers that need the
/// login-redirect behaviour handle the anonymous case before calling this.
#[must_use]
pub fn check(principal: &Principal, permission: Permission) -> Access {
    match principal {
        Principal::Anonymous => Access::Denied,
        Principal::Account(account) if account.has_perm(permission) => Access::Allowed,
        Principal::Account(_) => Access::Denied,
    }
}
