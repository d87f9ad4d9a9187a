//! Framework-independent state and reusable components for the admin pages.

mod menu;
mod page;
mod query;
mod student_table;

pub use menu::{Anchor, Menu};
pub use page::{Fetched, LoadScope, Loaded, PageState, load};
pub use query::QueryLayer;
pub use student_table::{StudentTable, format_birthday};
