pub const APP_LABEL: &str = "moduletrack";

pub mod pagination {

    pub const PAGE_SIZE: u64 = 10;
}

pub mod session {

    pub const USER_ID_KEY: &str = "user_id";

    pub const FLASH_KEY: &str = "flash_messages";
}

pub mod htmx {

    /// Request header htmx sets on every request it issues.
    pub const REQUEST_HEADER: &str = "hx-request";

    /// Header names are lowercase so they can be used as static names.
    pub const TRIGGER_HEADER: &str = "hx-trigger";

    /// Client event that closes the create/update/delete dialog.
    pub const HIDE_MODAL_EVENT: &str = "hideModal";
}

pub mod routes {

    pub const HOME: &str = "/";

    pub const PCB_TYPE_LIST: &str = "/list/";
}

pub mod seed {

    pub const DEFAULT_DUMMY_COUNT: u32 = 100;
}
