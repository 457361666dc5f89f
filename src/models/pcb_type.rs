use serde::{Deserialize, Serialize};

use crate::entities::pcb_types;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PcbType {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<pcb_types::Model> for PcbType {
    fn from(model: pcb_types::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}
