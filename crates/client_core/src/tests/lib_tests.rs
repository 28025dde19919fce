use super::*;
use std::time::Duration;

use axum::{extract::RawQuery, extract::State, http::StatusCode, routing::get, Json, Router};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct GatewayState {
    queries: Arc<Mutex<Vec<String>>>,
}

fn requested_page(query: &str) -> u32 {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page[number]="))
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

fn page_body(page: u32, per_page: u32, total: u64, items: usize) -> serde_json::Value {
    let last_page = total.div_ceil(u64::from(per_page)).max(1);
    let data: Vec<serde_json::Value> = (0..items)
        .map(|offset| {
            let id = u64::from(page) * 1000 + offset as u64;
            serde_json::json!({
                "id": id,
                "title": format!("Idea {id}"),
                "content": "<p>content</p>",
                "published_at": "2022-09-05 20:01:48",
                "slug": format!("idea-{id}"),
                "small_image": [{ "id": id, "mime": "image/jpeg", "file_name": "s.jpg", "url": format!("https://cdn.test/{id}.jpg") }],
                "medium_image": []
            })
        })
        .collect();
    serde_json::json!({
        "data": data,
        "meta": { "current_page": page, "last_page": last_page, "per_page": per_page, "total": total }
    })
}

async fn spawn_gateway(router: Router) -> Arc<GatewaySource> {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve gateway");
    });
    Arc::new(GatewaySource::parse(&format!("http://{addr}/api/ideas")).expect("gateway url"))
}

/// 27 ideas in total; nine per page regardless of the requested size.
async fn recording_gateway(state: GatewayState) -> Arc<GatewaySource> {
    async fn ideas(
        State(state): State<GatewayState>,
        RawQuery(query): RawQuery,
    ) -> Json<serde_json::Value> {
        let query = query.unwrap_or_default();
        let page = requested_page(&query);
        state.queries.lock().await.push(query);
        Json(page_body(page, 10, 27, 9))
    }

    spawn_gateway(Router::new().route("/api/ideas", get(ideas)).with_state(state)).await
}

#[tokio::test]
async fn open_hydrates_from_address_and_loads_first_page() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let location = Arc::new(MemoryLocation::new(""));

    let page = IdeasPage::open(location, source).await;
    let view = page.settled().await;

    assert_eq!(view.result.items.len(), 9);
    assert_eq!(view.result.total_items, 27);
    assert_eq!(view.result.last_page, 3);
    assert_eq!(page.range_summary().await.to_string(), "Showing 1 - 10 of 27");
    assert_eq!(
        state.queries.lock().await.as_slice(),
        &["page[number]=1&page[size]=10&append[]=small_image&append[]=medium_image&sort=-published_at".to_string()]
    );

    let cards = page.cards().await;
    assert_eq!(cards.len(), 9);
    assert_eq!(cards[0].published_label, "September 5, 2022");
    assert_eq!(cards[0].thumbnail_url, "https://cdn.test/1000.jpg");
}

#[tokio::test]
async fn page_size_change_resets_page_pushes_address_and_refetches() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let location = Arc::new(MemoryLocation::new("page=3&sort=published_at"));

    let page = IdeasPage::open(location.clone(), source).await;
    page.settled().await;

    let change = page.set_page_size(PageSize::Twenty);
    assert_eq!(change.state.page, 1);
    assert_eq!(location.current_query(), "page=1&size=20&sort=published_at");
    page.settled().await;

    let queries = state.queries.lock().await;
    assert_eq!(queries.len(), 2);
    assert_eq!(
        queries[1],
        "page[number]=1&page[size]=20&append[]=small_image&append[]=medium_image&sort=published_at"
    );
}

#[tokio::test]
async fn sort_change_resets_page() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("page=2")), source).await;
    page.settled().await;

    page.set_sort(SortOrder::Oldest);
    assert_eq!(page.state().page, 1);
    assert_eq!(page.address(), "page=1&size=10&sort=published_at");
    page.settled().await;
    assert!(state.queries.lock().await[1].ends_with("sort=published_at"));
}

#[tokio::test]
async fn page_links_follow_current_page_and_last_page() {
    let source = recording_gateway(GatewayState::default()).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("page=2")), source).await;
    page.settled().await;

    let links = page.page_links().await;
    assert_eq!(links.previous, Some(1));
    assert_eq!(links.next, Some(3));
    assert_eq!(links.links.len(), 3);
}

#[tokio::test]
async fn failed_refetch_keeps_last_good_page() {
    async fn ideas(RawQuery(query): RawQuery) -> axum::response::Response {
        use axum::response::IntoResponse;
        let page = requested_page(&query.unwrap_or_default());
        if page == 1 {
            Json(page_body(1, 10, 27, 10)).into_response()
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to fetch data" })),
            )
                .into_response()
        }
    }

    let source = spawn_gateway(Router::new().route("/api/ideas", get(ideas))).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("")), source).await;
    let before = page.settled().await.result;

    page.set_page(2);
    let view = page.settled().await;
    assert!(!view.loading);
    assert_eq!(view.result, before);
    let message = view.last_error.expect("error surfaced");
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("Failed to fetch data"), "{message}");
}

#[tokio::test]
async fn malformed_payload_is_reported_as_decode_failure() {
    let source = spawn_gateway(Router::new().route(
        "/api/ideas",
        get(|| async { Json(serde_json::json!({ "data": "nope" })) }),
    ))
    .await;

    let outcome = source.fetch_page(&ListState::default()).await;
    assert!(matches!(outcome, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let source = GatewaySource::parse(&format!("http://{addr}/api/ideas")).expect("url");

    let outcome = source.fetch_page(&ListState::default()).await;
    assert!(matches!(outcome, Err(FetchError::Transport(_))));
}

#[tokio::test]
async fn later_request_wins_when_earlier_one_resolves_last() {
    async fn ideas(RawQuery(query): RawQuery) -> Json<serde_json::Value> {
        let page = requested_page(&query.unwrap_or_default());
        if page == 1 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Json(page_body(page, 10, 27, 10))
    }

    let source = spawn_gateway(Router::new().route("/api/ideas", get(ideas))).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("page=1")), source).await;
    let mut events = page.subscribe_events();

    page.set_page(2);
    let view = page.settled().await;
    assert_eq!(view.result.current_page, 2);

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ListEvent::StaleDiscarded { sequence: 0 }) = events.recv().await {
                break;
            }
        }
    })
    .await
    .expect("stale response observed");

    let view = page.view().await;
    assert_eq!(view.result.current_page, 2);
    assert_eq!(view.result.items[0].id, 2000);
    assert!(!view.loading);
}

#[tokio::test]
async fn back_navigation_is_picked_up_by_sync() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let location = Arc::new(MemoryLocation::new("page=2"));
    let page = IdeasPage::open(location.clone(), source).await;
    page.settled().await;

    location.navigate("page=3&size=50");
    let change = page.sync_from_location();
    assert_eq!(change.sequence, 1);
    page.settled().await;

    assert!(state.queries.lock().await[1].starts_with("page[number]=3&page[size]=50&"));
    assert!(location.history().is_empty());
}

#[tokio::test]
async fn unchanged_triple_does_not_refetch() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("page=2")), source).await;
    page.settled().await;

    let change = page.set_page(2);
    assert_eq!(change.sequence, 0);
    page.settled().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.queries.lock().await.len(), 1);
}

#[tokio::test]
async fn rapid_mutations_each_issue_their_own_request() {
    let state = GatewayState::default();
    let source = recording_gateway(state.clone()).await;
    let page = IdeasPage::open(Arc::new(MemoryLocation::new("")), source).await;
    page.settled().await;
    let mut events = page.subscribe_events();

    page.set_page(2);
    page.set_page(3);

    tokio::time::timeout(Duration::from_secs(5), async {
        let mut pending = vec![1_u64, 2];
        while !pending.is_empty() {
            let resolved = match events.recv().await {
                Ok(ListEvent::Loaded { sequence, .. })
                | Ok(ListEvent::Failed { sequence, .. })
                | Ok(ListEvent::StaleDiscarded { sequence }) => sequence,
                Ok(ListEvent::Loading { .. }) => continue,
                Err(err) => panic!("event stream ended: {err}"),
            };
            pending.retain(|sequence| *sequence != resolved);
        }
    })
    .await
    .expect("both mutations resolved");

    let mut pages: Vec<u32> = state
        .queries
        .lock()
        .await
        .iter()
        .map(|query| requested_page(query))
        .collect();
    pages.sort_unstable();
    assert_eq!(pages, vec![1, 2, 3]);

    let view = page.settled().await;
    assert_eq!(view.result.current_page, 3);
}
