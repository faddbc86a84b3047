//! The `{count, next, previous, results}` envelope shared by list endpoints.

use actix_web::HttpRequest;
use rr_core::listing::{ListQuery, Page};
use serde::Serialize;

use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Wraps a fetched page, rejecting page numbers past the end.
pub fn paginate<T>(req: &HttpRequest, query: &ListQuery, page: Page<T>) -> ApiResult<Paginated<T>> {
    let request = query.page;
    request.ensure_in_range(page.total)?;

    let next = request.has_next(page.total).then(|| page_url(req, request.page + 1));
    let previous = request.has_previous().then(|| page_url(req, request.page - 1));

    Ok(Paginated { count: page.total, next, previous, results: page.items })
}

/// The current URL with `page` replaced. Other parameters keep their
/// original encoding and order. Page 1 drops the parameter entirely.
fn page_url(req: &HttpRequest, page: u32) -> String {
    let info = req.connection_info();
    let mut params: Vec<String> = req
        .query_string()
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    if page > 1 {
        params.push(format!("page={page}"));
    }

    let mut url = format!("{}://{}{}", info.scheme(), info.host(), req.path());
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rr_core::listing::{PageRequest, COMMUNITY_LIST};

    fn query(page: u32, size: u32) -> ListQuery {
        let mut q = ListQuery::first_page(&COMMUNITY_LIST, size);
        q.page = PageRequest { page, size };
        q
    }

    #[test]
    fn links_preserve_other_parameters() {
        let req = TestRequest::get()
            .uri("/api/subreddit?search=rust&page=2&ordering=-name")
            .insert_header(("host", "example.com"))
            .to_http_request();
        let envelope = paginate(&req, &query(2, 2), Page { items: vec![3, 4], total: 5 }).unwrap();

        assert_eq!(envelope.count, 5);
        assert_eq!(
            envelope.next.as_deref(),
            Some("http://example.com/api/subreddit?search=rust&ordering=-name&page=3")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("http://example.com/api/subreddit?search=rust&ordering=-name")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let req = TestRequest::get().uri("/api/post").to_http_request();
        let envelope = paginate(&req, &query(1, 10), Page { items: vec![1], total: 1 }).unwrap();
        assert!(envelope.next.is_none());
        assert!(envelope.previous.is_none());
    }

    #[test]
    fn page_past_the_end_is_rejected() {
        let req = TestRequest::get().uri("/api/post?page=3").to_http_request();
        let result = paginate(&req, &query(3, 10), Page::<i32> { items: vec![], total: 15 });
        assert!(result.is_err());
    }
}
