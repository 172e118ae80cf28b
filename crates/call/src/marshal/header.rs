use http::HeaderMap;

use crate::protocol::Headers;

/// Appends every field to the client's header map, keeping repeated names as
/// separate entries.
///
/// The map groups fields by name: the values of one name keep their order, names keep
/// the order of their first occurrence.
pub fn to_client_headers(headers: &Headers, target: &mut HeaderMap) {
    target.reserve(headers.len());
    for (name, value) in headers.iter() {
        target.append(name.clone(), value.clone());
    }
}

/// Reads the client's header map back into fields, grouped by name as the map holds them.
pub fn from_client_headers(source: &HeaderMap) -> Headers {
    let mut headers = Headers::with_capacity(source.len());
    for (name, value) in source {
        headers.add(name.clone(), value.clone());
    }
    headers
}
