pub use super::group_members::Entity as GroupMembers;
pub use super::group_permissions::Entity as GroupPermissions;
pub use super::groups::Entity as Groups;
pub use super::pcb_types::Entity as PcbTypes;
pub use super::user_permissions::Entity as UserPermissions;
pub use super::users::Entity as Users;
