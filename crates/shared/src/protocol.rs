use crate::domain::ListState;

/// Same-origin route served by the gateway.
pub const IDEAS_ROUTE: &str = "/api/ideas";

pub const DEFAULT_UPSTREAM_URL: &str = "https://suitmedia-backend.suitdev.com/api/ideas";

/// Image relations embedded in every item of a page.
pub const EMBEDDED_IMAGES: [&str; 2] = ["small_image", "medium_image"];

/// Query string the client sends to the gateway for one page.
///
/// Brackets are kept literal; the gateway relays this text unchanged.
pub fn gateway_query(state: &ListState) -> String {
    let mut query = format!(
        "page[number]={}&page[size]={}",
        state.page,
        state.size.get()
    );
    for relation in EMBEDDED_IMAGES {
        query.push_str("&append[]=");
        query.push_str(relation);
    }
    query.push_str("&sort=");
    query.push_str(state.sort.as_str());
    query
}
