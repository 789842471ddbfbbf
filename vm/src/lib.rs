pub mod error;
pub mod operating_system;
pub mod page_replacer;
pub mod page_table;
