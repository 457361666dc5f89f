//! Domain service for PCB type records.
//!
//! Writes go through [`PcbTypeForm::validate`]; nothing is persisted when
//! validation fails. Permission checks happen in the HTTP layer before any
//! method here is called.

use thiserror::Error;

use crate::forms::{FieldErrors, PcbTypeForm};
use crate::models::{Page, PcbType};

/// Errors specific to PCB type operations.
#[derive(Debug, Error)]
pub enum PcbTypeError {
    #[error("PCB type not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The confirmation value did not equal the record's current name.
    /// Carries the record as it was when compared.
    #[error("Confirmation name does not match for PCB type {}", .0.id)]
    ConfirmationMismatch(PcbType),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PcbTypeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PcbTypeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for PCB types.
#[async_trait::async_trait]
pub trait PcbTypeService: Send + Sync {
    /// Validates and stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`PcbTypeError::Validation`] when the form is invalid.
    async fn create(&self, form: &PcbTypeForm) -> Result<PcbType, PcbTypeError>;

    /// Replaces name and description of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`PcbTypeError::NotFound`] before looking at the form when
    /// the id is unknown, then [`PcbTypeError::Validation`] if invalid.
    async fn update(&self, id: i32, form: &PcbTypeForm) -> Result<PcbType, PcbTypeError>;

    async fn delete(&self, id: i32) -> Result<(), PcbTypeError>;

    /// Deletes the record only if `confirm_name` equals its current name
    /// exactly. Returns the deleted record.
    ///
    /// # Errors
    ///
    /// Returns [`PcbTypeError::ConfirmationMismatch`] and deletes nothing
    /// when the names differ.
    async fn delete_confirmed(&self, id: i32, confirm_name: &str)
    -> Result<PcbType, PcbTypeError>;

    async fn get(&self, id: i32) -> Result<PcbType, PcbTypeError>;

    /// All records ordered by id, optionally filtered by a case-insensitive
    /// substring of name or description.
    async fn list(&self, filter: Option<&str>) -> Result<Vec<PcbType>, PcbTypeError>;

    /// One page of [`PcbTypeService::list`]; out-of-range pages are clamped.
    async fn page(
        &self,
        filter: Option<&str>,
        requested_page: i64,
    ) -> Result<Page<PcbType>, PcbTypeError>;

    async fn count(&self) -> Result<u64, PcbTypeError>;

    /// Creates `count` numbered dummy records.
    async fn seed(&self, count: u32) -> Result<u64, PcbTypeError>;
}
