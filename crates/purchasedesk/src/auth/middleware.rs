use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

use crate::auth::session::SessionStore;

/// Attach the stored token as the raw `Authorization` header value.
///
/// Requests go out even without a token; the backend decides.
pub fn attach_token(request: RequestBuilder, session: &SessionStore) -> RequestBuilder {
    match session.token() {
        Some(token) => request.header(AUTHORIZATION, token),
        None => {
            tracing::debug!("No session token, sending request unauthenticated");
            request
        }
    }
}
