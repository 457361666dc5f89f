pub mod group;
pub mod pcb_type;
pub mod permission;
pub mod user;
