pub mod prelude;

pub mod group_members;
pub mod group_permissions;
pub mod groups;
pub mod pcb_types;
pub mod user_permissions;
pub mod users;
