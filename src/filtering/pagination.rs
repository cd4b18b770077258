/// Page size used when the caller gives no limit
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Largest page fetched by the bulk update/delete emulation. PocketBase has
/// no multi-record write endpoint, so matches beyond this are not touched.
pub const BULK_FETCH_LIMIT: u64 = 500;

/// Translate an offset/limit window into PocketBase's `(page, perPage)`.
///
/// Pages are 1-based. The offset is floored onto the page grid, so an
/// offset that is not a multiple of the limit lands on the page containing it.
///
/// # Examples
/// ```
/// use pbauth_adapter::filtering::page_for;
///
/// assert_eq!(page_for(Some(50), Some(50)), (2, 50));
/// assert_eq!(page_for(None, None), (1, 50));
/// ```
#[must_use]
pub fn page_for(offset: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let per_page = limit.filter(|&limit| limit > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let page = offset.map_or(1, |offset| (offset / per_page).saturating_add(1));
    (page, per_page)
}
