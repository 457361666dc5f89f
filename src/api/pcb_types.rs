//! PCB type list, create, update, delete and detail handlers.
//!
//! Every handler passes the permission gate before touching the record
//! store. Response shape (fragment or full page) is decided in
//! [`super::htmx`].

use axum::{
    Form,
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::htmx::{HxRequest, render};
use super::permissions::require;
use super::templates::{
    Layout, PcbTypeConfirmDeleteTemplate, PcbTypeDetailTemplate, PcbTypeFormTemplate,
    PcbTypeListTemplate, PcbTypeTableTemplate, TableView,
};
use super::{ApiError, AppState, flash};
use crate::constants::routes::PCB_TYPE_LIST;
use crate::domain::{Account, Permission, Principal};
use crate::forms::{FieldErrors, PcbTypeForm};
use crate::models::PcbType;
use crate::models::page::parse_page_number;
use crate::services::PcbTypeError;

const CONFIRMATION_MISMATCH: &str = "Confirmation name does not match.";

impl From<PcbTypeError> for ApiError {
    fn from(err: PcbTypeError) -> Self {
        match err {
            PcbTypeError::NotFound(id) => Self::not_found("PCB Type", id),
            PcbTypeError::Validation(errors) => Self::BadRequest(errors.to_string()),
            PcbTypeError::ConfirmationMismatch(_) => {
                Self::BadRequest(CONFIRMATION_MISMATCH.to_string())
            }
            PcbTypeError::Database(msg) => Self::DatabaseError(msg),
            PcbTypeError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub q: Option<String>,
    /// Kept raw so that non-numeric values fall back to page 1.
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> i64 {
        parse_page_number(self.page.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmDeleteForm {
    pub confirm_name: String,
}

/// Builds the results table for `page` of the `q`-filtered list and
/// consumes pending flash messages.
async fn table_view(
    state: &AppState,
    account: &Account,
    session: &Session,
    q: Option<&str>,
    page: i64,
) -> Result<TableView, ApiError> {
    let page = state.pcb_types().page(q, page).await?;
    let messages = flash::take(session).await?;
    Ok(TableView::new(page, q, account, messages))
}

/// Table fragment shown after a successful mutation: all records, the
/// page the dialog was opened from.
async fn refreshed_table(
    state: &AppState,
    account: &Account,
    session: &Session,
    page: i64,
) -> Result<PcbTypeTableTemplate, ApiError> {
    let list = table_view(state, account, session, None, page).await?;
    Ok(PcbTypeTableTemplate { list })
}

/// Non-numeric ids name no record.
fn record_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found("PCB Type", raw))
}

fn with_page(path: &str, query: &PageQuery) -> String {
    match query.page.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(page) => format!("{path}?page={}", urlencoding::encode(page)),
        None => path.to_string(),
    }
}

fn form_template(
    title: &str,
    action: String,
    submit_label: &str,
    form: PcbTypeForm,
    errors: &FieldErrors,
    session_messages: Vec<flash::FlashMessage>,
) -> PcbTypeFormTemplate {
    PcbTypeFormTemplate {
        title: title.to_string(),
        action,
        submit_label: submit_label.to_string(),
        name: form.name,
        description: form.description,
        name_errors: errors.get("name").to_vec(),
        description_errors: errors.get("description").to_vec(),
        messages: session_messages,
    }
}

/// GET /list/
pub async fn list(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    hx: HxRequest,
    session: Session,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let account = require(&principal, Permission::VIEW_PCB_TYPE, &uri, state.login_url())?;

    let q = query.q.as_deref();
    let list = table_view(&state, account, &session, q, parse_page_number(query.page.as_deref()))
        .await?;

    hx.choose(
        || PcbTypeTableTemplate { list: list.clone() },
        || PcbTypeListTemplate {
            layout: Layout::new(&principal, state.config()),
            list: list.clone(),
        },
    )
}

/// GET /create/
pub async fn create_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    require(&principal, Permission::ADD_PCB_TYPE, &uri, state.login_url())?;

    render(&form_template(
        "Create PCB Type",
        with_page("/create/", &query),
        "Create",
        PcbTypeForm::default(),
        &FieldErrors::new(),
        Vec::new(),
    ))
}

/// POST /create/
pub async fn create(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    hx: HxRequest,
    session: Session,
    uri: Uri,
    Query(query): Query<PageQuery>,
    Form(form): Form<PcbTypeForm>,
) -> Result<Response, ApiError> {
    let account = require(&principal, Permission::ADD_PCB_TYPE, &uri, state.login_url())?;

    match state.pcb_types().create(&form).await {
        Ok(_) => {
            flash::success(&session, "PCB Type created successfully!").await?;
            hx.mutation_success(
                refreshed_table(&state, account, &session, query.number()),
                PCB_TYPE_LIST,
            )
            .await
        }
        Err(PcbTypeError::Validation(errors)) => render(&form_template(
            "Create PCB Type",
            with_page("/create/", &query),
            "Create",
            form,
            &errors,
            Vec::new(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /update/{id}/
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    uri: Uri,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    require(&principal, Permission::CHANGE_PCB_TYPE, &uri, state.login_url())?;
    let id = record_id(&id)?;

    let record = state.pcb_types().get(id).await?;

    render(&form_template(
        "Update PCB Type",
        with_page(&format!("/update/{id}/"), &query),
        "Save",
        PcbTypeForm::new(record.name, record.description),
        &FieldErrors::new(),
        Vec::new(),
    ))
}

/// POST /update/{id}/
#[allow(clippy::too_many_arguments)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    hx: HxRequest,
    session: Session,
    uri: Uri,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    Form(form): Form<PcbTypeForm>,
) -> Result<Response, ApiError> {
    let account = require(&principal, Permission::CHANGE_PCB_TYPE, &uri, state.login_url())?;
    let id = record_id(&id)?;

    match state.pcb_types().update(id, &form).await {
        Ok(_) => {
            flash::success(&session, "PCB Type updated successfully!").await?;
            hx.mutation_success(
                refreshed_table(&state, account, &session, query.number()),
                PCB_TYPE_LIST,
            )
            .await
        }
        Err(PcbTypeError::Validation(errors)) => render(&form_template(
            "Update PCB Type",
            with_page(&format!("/update/{id}/"), &query),
            "Save",
            form,
            &errors,
            Vec::new(),
        )),
        Err(e) => Err(e.into()),
    }
}

fn confirm_template(
    record: PcbType,
    query: &PageQuery,
    messages: Vec<flash::FlashMessage>,
) -> PcbTypeConfirmDeleteTemplate {
    let action = with_page(&format!("/delete/{}/", record.id), query);
    PcbTypeConfirmDeleteTemplate {
        record,
        action,
        messages,
    }
}

/// GET /delete/{id}/
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    uri: Uri,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    require(&principal, Permission::DELETE_PCB_TYPE, &uri, state.login_url())?;
    let id = record_id(&id)?;

    let record = state.pcb_types().get(id).await?;
    render(&confirm_template(record, &query, Vec::new()))
}

/// POST /delete/{id}/
///
/// Deletes only when `confirm_name` equals the record's current name.
#[allow(clippy::too_many_arguments)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    hx: HxRequest,
    session: Session,
    uri: Uri,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    Form(form): Form<ConfirmDeleteForm>,
) -> Result<Response, ApiError> {
    let account = require(&principal, Permission::DELETE_PCB_TYPE, &uri, state.login_url())?;
    let id = record_id(&id)?;

    match state
        .pcb_types()
        .delete_confirmed(id, &form.confirm_name)
        .await
    {
        Ok(record) => {
            flash::success(
                &session,
                format!("PCB Type '{}' deleted successfully!", record.name),
            )
            .await?;
            hx.mutation_success(
                refreshed_table(&state, account, &session, query.number()),
                PCB_TYPE_LIST,
            )
            .await
        }
        Err(PcbTypeError::ConfirmationMismatch(record)) => {
            flash::error(&session, CONFIRMATION_MISMATCH).await?;
            let messages = flash::take(&session).await?;
            render(&confirm_template(record, &query, messages))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /view/{id}/
pub async fn detail(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let account = require(&principal, Permission::VIEW_PCB_TYPE, &uri, state.login_url())?;
    let id = record_id(&id)?;

    let record = state.pcb_types().get(id).await?;

    render(&PcbTypeDetailTemplate {
        record,
        can_change: account.has_perm(Permission::CHANGE_PCB_TYPE),
        can_delete: account.has_perm(Permission::DELETE_PCB_TYPE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_page_keeps_return_page() {
        let none = PageQuery::default();
        assert_eq!(with_page("/create/", &none), "/create/");

        let two = PageQuery {
            page: Some("2".to_string()),
        };
        assert_eq!(with_page("/update/4/", &two), "/update/4/?page=2");
        assert_eq!(two.number(), 2);

        let junk = PageQuery {
            page: Some("abc".to_string()),
        };
        assert_eq!(junk.number(), 1);
    }

    #[test]
    fn test_record_id_rejects_non_numeric_as_not_found() {
        assert_eq!(record_id("42").unwrap(), 42);
        assert!(matches!(record_id("abc"), Err(ApiError::NotFound(_))));
        assert!(matches!(record_id("99999999999"), Err(ApiError::NotFound(_))));
    }
}
