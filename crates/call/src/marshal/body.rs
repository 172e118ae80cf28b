use std::sync::Arc;

use http::{HeaderValue, header};
use micro_client::{ClientRequest, ClientResponse};
use mime::Mime;
use tracing::{debug, trace};

use crate::error::CallError;
use crate::marshal::header::from_client_headers;
use crate::protocol::{Request, Response, ResponseBody};

/// Writes the request body, if any, as a single chunk.
///
/// A non-empty body replaces any caller supplied `content-type` and `content-length`;
/// the content type defaults to `application/octet-stream`.
pub fn write_request_body(request: &Request, target: &mut ClientRequest) -> Result<(), CallError> {
    let Some(body) = request.body().filter(|body| !body.is_empty()) else {
        return Ok(());
    };

    let content_type = body.content_type().unwrap_or(&mime::APPLICATION_OCTET_STREAM);
    let content_type = HeaderValue::from_str(content_type.as_ref()).map_err(CallError::wrapped)?;
    target.put_header(header::CONTENT_TYPE, content_type);
    target.put_header(header::CONTENT_LENGTH, HeaderValue::from(body.content_length()));

    trace!(size = body.content_length(), "write request body");
    target.write(body.content().clone());
    Ok(())
}

/// Builds the response of a call from the buffered client response.
pub fn assemble_response(request: Arc<Request>, response: ClientResponse) -> Response {
    let code = response.status();
    let message = response.reason().to_string();
    let headers = from_client_headers(response.headers());
    let content_type = response_content_type(&response);
    let (_, bytes) = response.into_parts();

    Response::new(code, message, headers, ResponseBody::new(content_type, bytes), request)
}

fn response_content_type(response: &ClientResponse) -> Option<Mime> {
    let value = response.header(header::CONTENT_TYPE)?;
    match value.to_str().ok().and_then(|value| value.parse::<Mime>().ok()) {
        Some(mime) => Some(mime),
        None => {
            debug!(content_type = ?value, "ignore unparseable content type");
            None
        }
    }
}
