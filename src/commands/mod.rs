pub mod activity_cmd;
pub mod auth_cmd;
pub mod catalog_cmd;
pub mod purchase_cmd;
pub mod report_cmd;
pub mod user_cmd;
