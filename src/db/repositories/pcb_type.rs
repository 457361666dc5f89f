use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};

use crate::entities::{pcb_types, prelude::*};
use crate::models::page::{clamp_page, page_count};
use crate::models::{Page, PcbType};

/// Outcome of a confirmed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(PcbType),
    Mismatch(PcbType),
    NotFound,
}

pub struct PcbTypeRepository {
    conn: DatabaseConnection,
}

impl PcbTypeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str, description: &str) -> Result<PcbType> {
        let active = pcb_types::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert PCB type")?;

        Ok(model.into())
    }

    /// Returns `None` when no record has this id.
    pub async fn update(&self, id: i32, name: &str, description: &str) -> Result<Option<PcbType>> {
        let Some(existing) = PcbTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query PCB type for update")?
        else {
            return Ok(None);
        };

        let mut active: pcb_types::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.description = Set(description.to_string());

        match active.update(&self.conn).await {
            Ok(model) => Ok(Some(model.into())),
            // Deleted since the lookup.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e).context("Failed to update PCB type"),
        }
    }

    /// Returns `false` when no record has this id.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = PcbTypes::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete PCB type")?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes the record only if `confirm_name` equals its current name.
    ///
    /// The comparison happens inside the DELETE itself, so a concurrent
    /// rename or delete makes this call lose cleanly instead of failing.
    pub async fn delete_if_named(&self, id: i32, confirm_name: &str) -> Result<DeleteOutcome> {
        let Some(model) = PcbTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query PCB type for delete")?
        else {
            return Ok(DeleteOutcome::NotFound);
        };

        if model.name != confirm_name {
            return Ok(DeleteOutcome::Mismatch(model.into()));
        }

        let result = PcbTypes::delete_many()
            .filter(pcb_types::Column::Id.eq(id))
            .filter(pcb_types::Column::Name.eq(confirm_name))
            .exec(&self.conn)
            .await
            .context("Failed to delete PCB type")?;

        if result.rows_affected > 0 {
            return Ok(DeleteOutcome::Deleted(model.into()));
        }

        // Lost a race: renamed or deleted since the lookup.
        Ok(self
            .get(id)
            .await?
            .map_or(DeleteOutcome::NotFound, DeleteOutcome::Mismatch))
    }

    pub async fn get(&self, id: i32) -> Result<Option<PcbType>> {
        let model = PcbTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query PCB type by ID")?;

        Ok(model.map(PcbType::from))
    }

    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<PcbType>> {
        let models = filtered(filter)
            .all(&self.conn)
            .await
            .context("Failed to list PCB types")?;

        Ok(models.into_iter().map(PcbType::from).collect())
    }

    /// Fetches one page of the filtered list. `requested_page` is clamped
    /// into the valid range.
    pub async fn page(
        &self,
        filter: Option<&str>,
        requested_page: i64,
        page_size: u64,
    ) -> Result<Page<PcbType>> {
        let paginator = filtered(filter).paginate(&self.conn, page_size);

        let total_items = paginator
            .num_items()
            .await
            .context("Failed to count PCB types")?;
        let num_pages = page_count(total_items, page_size);
        let number = clamp_page(requested_page, num_pages);

        let items = paginator
            .fetch_page(number - 1)
            .await
            .context("Failed to fetch PCB type page")?;

        Ok(Page {
            items: items.into_iter().map(PcbType::from).collect(),
            number,
            num_pages,
            total_items,
            page_size,
        })
    }

    pub async fn count(&self) -> Result<u64> {
        PcbTypes::find()
            .count(&self.conn)
            .await
            .context("Failed to count PCB types")
    }

    /// Inserts many records at once, in order, returning how many were written.
    pub async fn insert_many(&self, records: Vec<(String, String)>) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len() as u64;
        let models = records
            .into_iter()
            .map(|(name, description)| pcb_types::ActiveModel {
                name: Set(name),
                description: Set(description),
                ..Default::default()
            });

        let txn = self.conn.begin().await?;
        PcbTypes::insert_many(models)
            .exec(&txn)
            .await
            .context("Failed to insert PCB types")?;
        txn.commit().await?;

        Ok(count)
    }
}

/// All records ordered by id, narrowed to those whose name or description
/// contains `filter` (case-insensitive). Blank filters select everything.
fn filtered(filter: Option<&str>) -> Select<PcbTypes> {
    let query = PcbTypes::find().order_by_asc(pcb_types::Column::Id);

    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(term) => {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            query.filter(
                Condition::any()
                    .add(
                        Expr::expr(lower(pcb_types::Column::Name))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(lower(pcb_types::Column::Description))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            )
        }
        None => query,
    }
}

fn lower(column: pcb_types::Column) -> sea_orm::sea_query::SimpleExpr {
    sea_orm::sea_query::Func::lower(Expr::col((PcbTypes, column))).into()
}

/// Escapes LIKE wildcards so the term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
