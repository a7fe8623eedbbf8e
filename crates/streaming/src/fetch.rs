use futures_util::future::LocalBoxFuture;

use crate::LoadError;

/// Single-GET text transport. Implementations make exactly one attempt per
/// call; retry policy belongs to callers.
pub trait Fetcher {
    fn fetch_text(&self, url: &str) -> LocalBoxFuture<'static, Result<String, LoadError>>;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use futures_util::FutureExt;
    use futures_util::future::LocalBoxFuture;
    use tracing::debug;

    use super::Fetcher;
    use crate::LoadError;

    /// `reqwest`-backed fetcher. Must be polled inside a Tokio runtime.
    #[derive(Debug, Clone, Default)]
    pub struct HttpFetcher {
        http: reqwest::Client,
    }

    impl HttpFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(http: reqwest::Client) -> Self {
            Self { http }
        }
    }

    impl Fetcher for HttpFetcher {
        fn fetch_text(&self, url: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
            let http = self.http.clone();
            let url = url.to_string();
            async move {
                debug!(url = %url, "fetching");
                let response = http.get(&url).send().await.map_err(|e| LoadError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::HttpStatus {
                        url,
                        status: status.as_u16(),
                    });
                }

                response.text().await.map_err(|e| LoadError::Http {
                    url,
                    message: e.to_string(),
                })
            }
            .boxed_local()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use futures_util::FutureExt;
    use futures_util::future::LocalBoxFuture;
    use gloo_net::http::Request;
    use tracing::debug;

    use super::Fetcher;
    use crate::LoadError;

    /// Browser `fetch` via `gloo-net`.
    #[derive(Debug, Clone, Default)]
    pub struct HttpFetcher;

    impl HttpFetcher {
        pub fn new() -> Self {
            Self
        }
    }

    impl Fetcher for HttpFetcher {
        fn fetch_text(&self, url: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
            let url = url.to_string();
            async move {
                debug!(url = %url, "fetching");
                let resp = Request::get(&url).send().await.map_err(|e| LoadError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
                if !resp.ok() {
                    return Err(LoadError::HttpStatus {
                        url,
                        status: resp.status(),
                    });
                }
                resp.text().await.map_err(|e| LoadError::Http {
                    url,
                    message: e.to_string(),
                })
            }
            .boxed_local()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpFetcher;
#[cfg(target_arch = "wasm32")]
pub use web::HttpFetcher;
