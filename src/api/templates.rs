//! Compiled `askama` templates and the view data they render.

use askama::Template;

use super::flash::FlashMessage;
use crate::config::Config;
use crate::domain::{Account, Permission, Principal};
use crate::models::{Page, PcbType};

/// Data every full page needs for its header.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub username: String,
    pub is_authenticated: bool,
    pub is_staff: bool,
    pub can_view_pcb_types: bool,
    pub allow_registration: bool,
    pub messages: Vec<FlashMessage>,
}

impl Layout {
    #[must_use]
    pub fn new(principal: &Principal, config: &Config) -> Self {
        let account = principal.account();
        Self {
            username: principal.username().unwrap_or_default().to_string(),
            is_authenticated: principal.is_authenticated(),
            is_staff: account.is_some_and(|a| a.is_active && a.is_staff),
            can_view_pcb_types: account.is_some_and(|a| a.has_perm(Permission::VIEW_PCB_TYPE)),
            allow_registration: config.server.allow_registration,
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Vec<FlashMessage>) -> Self {
        self.messages = messages;
        self
    }
}

/// What the results table needs: one page, the search term, pagination
/// links and the controls the account may use.
#[derive(Debug, Clone)]
pub struct TableView {
    pub records: Vec<PcbType>,
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub start_index: u64,
    pub end_index: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: u64,
    pub next_page: u64,
    pub q: String,
    /// `&q=<encoded>` or empty, appended to pagination links.
    pub q_param: String,
    pub can_add: bool,
    pub can_change: bool,
    pub can_delete: bool,
    pub messages: Vec<FlashMessage>,
}

impl TableView {
    #[must_use]
    pub fn new(
        page: Page<PcbType>,
        q: Option<&str>,
        account: &Account,
        messages: Vec<FlashMessage>,
    ) -> Self {
        let q = q.map(str::trim).unwrap_or_default().to_string();
        let q_param = if q.is_empty() {
            String::new()
        } else {
            format!("&q={}", urlencoding::encode(&q))
        };

        Self {
            number: page.number,
            num_pages: page.num_pages,
            total_items: page.total_items,
            start_index: page.start_index(),
            end_index: page.end_index(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_page: page.previous_page_number(),
            next_page: page.next_page_number(),
            records: page.items,
            q,
            q_param,
            can_add: account.has_perm(Permission::ADD_PCB_TYPE),
            can_change: account.has_perm(Permission::CHANGE_PCB_TYPE),
            can_delete: account.has_perm(Permission::DELETE_PCB_TYPE),
            messages,
        }
    }
}

#[derive(Template)]
#[template(path = "pcb_type/list.html")]
pub struct PcbTypeListTemplate {
    pub layout: Layout,
    pub list: TableView,
}

#[derive(Template)]
#[template(path = "pcb_type/partials/pcb_type_table.html")]
pub struct PcbTypeTableTemplate {
    pub list: TableView,
}

#[derive(Template)]
#[template(path = "pcb_type/partials/pcb_type_form.html")]
pub struct PcbTypeFormTemplate {
    pub title: String,
    /// Submit target, including the `page` to return to.
    pub action: String,
    pub submit_label: String,
    pub name: String,
    pub description: String,
    pub name_errors: Vec<String>,
    pub description_errors: Vec<String>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "pcb_type/partials/pcb_type_confirm_delete.html")]
pub struct PcbTypeConfirmDeleteTemplate {
    pub record: PcbType,
    pub action: String,
    pub messages: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "pcb_type/partials/pcb_type_detail.html")]
pub struct PcbTypeDetailTemplate {
    pub record: PcbType,
    pub can_change: bool,
    pub can_delete: bool,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "registration/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    pub non_field_errors: Vec<String>,
    pub username_errors: Vec<String>,
    pub password_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "registration/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub username: String,
    pub username_errors: Vec<String>,
    pub password1_errors: Vec<String>,
    pub password2_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}
