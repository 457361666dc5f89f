//! `SeaORM` implementation of the `PcbTypeService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::constants::pagination::PAGE_SIZE;
use crate::db::{DeleteOutcome, Store};
use crate::forms::PcbTypeForm;
use crate::models::{Page, PcbType};
use crate::services::pcb_type_service::{PcbTypeError, PcbTypeService};

pub struct SeaOrmPcbTypeService {
    store: Store,
}

impl SeaOrmPcbTypeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[must_use]
pub fn dummy_record(i: u32) -> (String, String) {
    (
        format!("Dummy PCB Type {i}"),
        format!("Description for Dummy PCB Type {i}"),
    )
}

#[async_trait]
impl PcbTypeService for SeaOrmPcbTypeService {
    async fn create(&self, form: &PcbTypeForm) -> Result<PcbType, PcbTypeError> {
        form.validate().map_err(PcbTypeError::Validation)?;

        let record = self
            .store
            .create_pcb_type(&form.name, &form.description)
            .await?;

        metrics::counter!("pcb_types_created_total").increment(1);
        info!(pcb_type_id = record.id, name = %record.name, "PCB type created");

        Ok(record)
    }

    async fn update(&self, id: i32, form: &PcbTypeForm) -> Result<PcbType, PcbTypeError> {
        if self.store.get_pcb_type(id).await?.is_none() {
            return Err(PcbTypeError::NotFound(id));
        }

        form.validate().map_err(PcbTypeError::Validation)?;

        let record = self
            .store
            .update_pcb_type(id, &form.name, &form.description)
            .await?
            .ok_or(PcbTypeError::NotFound(id))?;

        metrics::counter!("pcb_types_updated_total").increment(1);
        info!(pcb_type_id = id, name = %record.name, "PCB type updated");

        Ok(record)
    }

    async fn delete(&self, id: i32) -> Result<(), PcbTypeError> {
        if !self.store.delete_pcb_type(id).await? {
            return Err(PcbTypeError::NotFound(id));
        }

        metrics::counter!("pcb_types_deleted_total").increment(1);
        info!(pcb_type_id = id, "PCB type deleted");

        Ok(())
    }

    async fn delete_confirmed(
        &self,
        id: i32,
        confirm_name: &str,
    ) -> Result<PcbType, PcbTypeError> {
        match self.store.delete_pcb_type_if_named(id, confirm_name).await? {
            DeleteOutcome::Deleted(record) => {
                metrics::counter!("pcb_types_deleted_total").increment(1);
                info!(pcb_type_id = id, name = %record.name, "PCB type deleted");
                Ok(record)
            }
            DeleteOutcome::Mismatch(record) => {
                warn!(pcb_type_id = id, "Delete confirmation name mismatch");
                Err(PcbTypeError::ConfirmationMismatch(record))
            }
            DeleteOutcome::NotFound => Err(PcbTypeError::NotFound(id)),
        }
    }

    async fn get(&self, id: i32) -> Result<PcbType, PcbTypeError> {
        self.store
            .get_pcb_type(id)
            .await?
            .ok_or(PcbTypeError::NotFound(id))
    }

    async fn list(&self, filter: Option<&str>) -> Result<Vec<PcbType>, PcbTypeError> {
        Ok(self.store.list_pcb_types(filter).await?)
    }

    async fn page(
        &self,
        filter: Option<&str>,
        requested_page: i64,
    ) -> Result<Page<PcbType>, PcbTypeError> {
        Ok(self
            .store
            .page_pcb_types(filter, requested_page, PAGE_SIZE)
            .await?)
    }

    async fn count(&self) -> Result<u64, PcbTypeError> {
        Ok(self.store.count_pcb_types().await?)
    }

    async fn seed(&self, count: u32) -> Result<u64, PcbTypeError> {
        let records = (1..=count).map(dummy_record).collect();
        let inserted = self.store.insert_pcb_types(records).await?;

        info!(count = inserted, "Seeded dummy PCB types");
        Ok(inserted)
    }
}
