pub mod pcb_type_service;
pub mod pcb_type_service_impl;
pub use pcb_type_service::{PcbTypeError, PcbTypeService};
pub use pcb_type_service_impl::SeaOrmPcbTypeService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, AccountSummary};
pub use account_service_impl::SeaOrmAccountService;
