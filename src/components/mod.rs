pub mod breadcrumb;
pub mod file_list;
pub mod sidebar;
pub mod status_bar;
