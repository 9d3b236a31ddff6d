//! Unbounded reads in fixed-size pages.

use std::future::Future;

/// Fetches rows through `fetch_page(offset, limit)`.
///
/// With `limit` set, exactly one request for at most `limit` rows is made.
/// Without it, pages of `page_size` rows are requested until a page comes
/// back short, so a table whose size is an exact multiple of `page_size`
/// costs one extra empty request.
///
/// # Errors
///
/// Returns the first error produced by `fetch_page`; rows from earlier pages
/// are discarded.
pub async fn fetch_paginated<T, E, F, Fut>(
    limit: Option<i64>,
    page_size: i64,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    if let Some(limit) = limit {
        return fetch_page(0, limit.max(0)).await;
    }

    let page_size = page_size.max(1);
    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch_page(offset, page_size).await?;
        let fetched = i64::try_from(page.len()).unwrap_or(i64::MAX);
        rows.extend(page);
        if fetched < page_size {
            break;
        }
        offset += page_size;
    }
    Ok(rows)
}

/// Escapes `ILIKE` wildcards so user input matches literally.
#[must_use]
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%needle%` pattern for a case-insensitive substring match, or `None` for a
/// blank filter.
pub(crate) fn contains_pattern(needle: Option<&str>) -> Option<String> {
    needle
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}
