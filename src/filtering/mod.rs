//! # Filtering, Sorting & Pagination
//!
//! Translates the host framework's structured query pieces into the
//! parameters PocketBase's list endpoint understands.
//!
//! ## Main Components
//!
//! - **[`try_compile_where`]**: condition list to filter expression, rejecting unsafe input
//! - **[`compile_where`]**: lenient variant that drops rejected conditions
//! - **[`SortBy`]**: single-key sort to the `sort` parameter
//! - **[`page_for`]**: offset/limit window to `page`/`perPage`
//!
//! ## Filter Examples
//!
//! ```rust
//! use pbauth_adapter::filtering::{Condition, FilterOperator, compile_where};
//!
//! let filter = compile_where(&[
//!     Condition::eq("status", "active"),
//!     Condition::new("age", FilterOperator::Gte, 18),
//! ]);
//! assert_eq!(filter, r#"status = "active" && age >= 18"#);
//! ```
//!
//! Conditions are always combined with `&&`; there is no OR or grouping.

pub mod conditions;
pub mod pagination;
pub mod sort;

// Re-export commonly used items
pub use conditions::{Condition, FilterOperator, compile_optional_where, compile_where, try_compile_where};
pub use pagination::{BULK_FETCH_LIMIT, DEFAULT_PAGE_SIZE, page_for};
pub use sort::{SortBy, SortDirection, parse_sorting};
