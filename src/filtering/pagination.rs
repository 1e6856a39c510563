use crate::errors::ApiError;

/// `(offset, limit)` of a 1-based page.
///
/// Backends bind `LIMIT`/`OFFSET` as signed 64-bit integers, so both halves of
/// the window must fit in an `i64`.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for page 0, page size 0, or a limit or offset
/// beyond `i64::MAX`.
pub fn page_window(page: u64, page_size: u64) -> Result<(u64, u64), ApiError> {
    if page == 0 {
        return Err(ApiError::bad_request("page must be 1 or greater"));
    }
    if page_size == 0 {
        return Err(ApiError::bad_request("pageSize must be greater than 0"));
    }
    if i64::try_from(page_size).is_err() {
        return Err(ApiError::bad_request("pageSize is out of range"));
    }
    let offset = (page - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| ApiError::bad_request("page is out of range"))?;
    Ok((offset, page_size))
}
