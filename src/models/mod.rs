pub mod page;
pub mod pcb_type;

pub use page::Page;
pub use pcb_type::PcbType;
