//! The values a call works on: requests, responses and their ordered headers.

mod headers;
pub use headers::Headers;

mod request;
pub use request::BuildError;
pub use request::Request;
pub use request::RequestBody;
pub use request::RequestBuilder;

mod response;
pub use response::Response;
pub use response::ResponseBody;
