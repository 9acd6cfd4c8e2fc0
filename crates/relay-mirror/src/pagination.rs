//! Cursor-based pagination over mirror list endpoints (spec §4.2
//! "Pagination", §8 "Pagination cap").

use relay_primitives::json::JsonValue;

use crate::error::MirrorNodeClientError;

/// Accumulates `result[property]` across pages, following
/// `result.links.next` until it is absent or `page_max` pages have been
/// fetched. Never silently truncates: hitting the cap is an error.
pub async fn paginate<F, Fut>(
    mut fetch_page: F,
    property: &str,
    page_max: usize,
) -> Result<Vec<JsonValue>, MirrorNodeClientError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<Option<JsonValue>, MirrorNodeClientError>>,
{
    let mut results = Vec::new();
    let mut next: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let Some(page) = fetch_page(next.clone()).await? else { break };
        pages += 1;

        if let Some(JsonValue::Array(items)) = page.get(property) {
            results.extend(items.iter().cloned());
        }

        next = page
            .get("links")
            .and_then(|links| links.get("next"))
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        if next.is_none() {
            break;
        }
        if pages >= page_max {
            return Err(relay_primitives::error::JsonRpcError::pagination_max(page_max).into());
        }
    }

    Ok(results)
}

impl From<relay_primitives::error::JsonRpcError> for MirrorNodeClientError {
    fn from(err: relay_primitives::error::JsonRpcError) -> Self {
        MirrorNodeClientError::new(500, err.message).with_detail("PAGINATION_MAX")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page(items: &[i64], next: Option<&str>) -> JsonValue {
        JsonValue::Object(vec![
            (
                "logs".to_string(),
                JsonValue::Array(
                    items
                        .iter()
                        .map(|n| JsonValue::Number(relay_primitives::json::BigNumber::from_u64(*n as u64)))
                        .collect(),
                ),
            ),
            (
                "links".to_string(),
                JsonValue::Object(vec![(
                    "next".to_string(),
                    next.map_or(JsonValue::Null, |n| JsonValue::String(n.to_string())),
                )]),
            ),
        ])
    }

    #[tokio::test]
    async fn stops_when_next_link_absent() {
        let calls = AtomicUsize::new(0);
        let result = paginate(
            |_cursor| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Ok(Some(page(&[1, 2], Some("/next"))))
                    } else {
                        Ok(Some(page(&[3], None)))
                    }
                }
            },
            "logs",
            10,
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn raises_pagination_max_without_truncating_silently() {
        let result = paginate(
            |_cursor| async move { Ok(Some(page(&[1], Some("/next")))) },
            "logs",
            3,
        )
        .await;

        assert!(result.is_err());
    }
}
