//! Fragment versus full-page response shaping.
//!
//! This is the only module that reads the htmx request header or sets the
//! `HX-Trigger` response header.

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::future::Future;

use super::ApiError;
use crate::constants::htmx::{HIDE_MODAL_EVENT, REQUEST_HEADER, TRIGGER_HEADER};

/// Whether the request came from htmx and wants a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HxRequest(pub bool);

impl HxRequest {
    #[must_use]
    pub const fn is_fragment(self) -> bool {
        self.0
    }

    /// Renders `fragment` for htmx requests and `page` otherwise. Only the
    /// chosen template is built. Both carry `Vary: HX-Request` so caches
    /// keep them apart.
    pub fn choose<F, P>(
        self,
        fragment: impl FnOnce() -> F,
        page: impl FnOnce() -> P,
    ) -> Result<Response, ApiError>
    where
        F: Template,
        P: Template,
    {
        let mut response = if self.0 {
            render(&fragment())?
        } else {
            render(&page())?
        };
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("HX-Request"));
        Ok(response)
    }

    /// Response for a successful create, update or delete. Fragment
    /// requests get the awaited `fragment` plus the `hideModal` trigger;
    /// full-page requests get a 303 to `redirect_to` and `fragment` is never
    /// polled.
    pub async fn mutation_success<T, Fut>(
        self,
        fragment: Fut,
        redirect_to: &str,
    ) -> Result<Response, ApiError>
    where
        T: Template,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !self.0 {
            return Ok(Redirect::to(redirect_to).into_response());
        }

        let mut response = render(&fragment.await?)?;
        response.headers_mut().insert(
            TRIGGER_HEADER,
            HeaderValue::from_static(HIDE_MODAL_EVENT),
        );
        Ok(response)
    }
}

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(REQUEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        Ok(Self(is_htmx))
    }
}

/// Renders a template into a 200 HTML response.
pub fn render<T: Template>(template: &T) -> Result<Response, ApiError> {
    Ok(Html(template.render()?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode, header};

    #[derive(Template)]
    #[template(source = "<p>{{ text }}</p>", ext = "html")]
    struct Snippet {
        text: &'static str,
    }

    async fn extract(request: Request<()>) -> HxRequest {
        let (mut parts, ()) = request.into_parts();
        HxRequest::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_header_detection() {
        let plain = Request::builder().body(()).unwrap();
        assert!(!extract(plain).await.is_fragment());

        let htmx = Request::builder()
            .header("HX-Request", "true")
            .body(())
            .unwrap();
        assert!(extract(htmx).await.is_fragment());

        let other = Request::builder()
            .header("HX-Request", "false")
            .body(())
            .unwrap();
        assert!(!extract(other).await.is_fragment());
    }

    #[tokio::test]
    async fn test_mutation_success_shapes() {
        let response = HxRequest(true)
            .mutation_success(async { Ok(Snippet { text: "table" }) }, "/list/")
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Trigger"], "hideModal");

        let response = HxRequest(false)
            .mutation_success(
                async { Err::<Snippet, _>(ApiError::internal("must not be polled")) },
                "/list/",
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/list/");
        assert!(response.headers().get("HX-Trigger").is_none());
    }

    #[test]
    fn test_choose_builds_only_one_template() {
        let response = HxRequest(true)
            .choose(
                || Snippet { text: "fragment" },
                || -> Snippet { panic!("page must not be built") },
            )
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_choose_varies_on_request_header() {
        for htmx in [true, false] {
            let response = HxRequest(htmx)
                .choose(|| Snippet { text: "fragment" }, || Snippet { text: "page" })
                .unwrap();
            assert_eq!(response.headers()[header::VARY], "HX-Request");
        }
    }
}
