//! Domain types shared by the services and the HTTP layer.

pub mod permissions;

use std::collections::BTreeSet;

pub use permissions::{Access, Action, Permission, Resource};

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Account(Account),
}

impl Principal {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Account(_))
    }

    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        match self {
            Self::Account(account) => Some(account),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.account().map(|a| a.username.as_str())
    }
}

/// An account together with its effective permissions and group names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    /// Qualified codenames granted directly or through a group.
    pub permissions: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

impl Account {
    /// Active superusers hold every permission; inactive accounts hold none.
    #[must_use]
    pub fn has_perm(&self, permission: Permission) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_superuser || self.permissions.contains(&permission.qualified())
    }

    #[must_use]
    pub fn is_in_group(&self, name: &str) -> bool {
        self.groups.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_accessors() {
        let account = Account {
            id: 7,
            username: "ada".to_string(),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            permissions: BTreeSet::new(),
            groups: BTreeSet::from(["Assembly".to_string()]),
        };

        assert!(!Principal::Anonymous.is_authenticated());
        assert_eq!(Principal::Anonymous.username(), None);

        let principal = Principal::Account(account);
        assert!(principal.is_authenticated());
        assert_eq!(principal.username(), Some("ada"));
        assert!(principal.account().is_some_and(|a| a.is_in_group("Assembly")));
        assert!(!principal.account().is_some_and(|a| a.is_in_group("Test")));
    }
}
