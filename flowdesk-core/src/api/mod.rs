//! The one outbound HTTP path of the client.
//!
//! Every typed endpoint goes through [`ApiClient::send`], which applies the
//! request hooks (bearer token) before sending and the error hooks (401
//! policy) exactly once per failed call.

mod auth;
mod dashboard;
mod hooks;
mod notifications;
mod projects;
mod tasks;
mod teams;
mod transport;
mod users;

pub use hooks::{BearerAuth, ErrorHook, Navigator, RequestHook, SessionExpiry};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    error_hooks: Vec<Arc<dyn ErrorHook>>,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    error_hooks: Vec<Arc<dyn ErrorHook>>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: impl HttpTransport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn request_hook(mut self, hook: impl RequestHook) -> Self {
        self.request_hooks.push(Arc::new(hook));
        self
    }

    pub fn error_hook(mut self, hook: impl ErrorHook) -> Self {
        self.error_hooks.push(Arc::new(hook));
        self
    }

    /// Bearer injection plus the 401 policy over the given session.
    pub fn session(self, session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        self.request_hook(BearerAuth::new(session.clone()))
            .error_hook(SessionExpiry::new(session, navigator))
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            inner: Arc::new(Inner {
                config: self.config,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
                request_hooks: self.request_hooks,
                error_hooks: self.error_hooks,
            }),
        }
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: None,
            request_hooks: Vec::new(),
            error_hooks: Vec::new(),
        }
    }

    /// reqwest transport, bearer token from `session`, 401 clears `session`
    /// and navigates to login.
    pub fn standard(
        config: ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::builder(config).session(session, navigator).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for hook in &self.inner.request_hooks {
            hook.decorate(&mut request);
        }

        let url = self.inner.config.url(&request.path);
        tracing::debug!(method = %request.method, path = %request.path, "api request");

        let error = match self.inner.transport.execute(&url, &request).await {
            Ok(resp) if resp.is_success() => {
                tracing::debug!(path = %request.path, status = resp.status, "api response");
                return Ok(resp);
            }
            Ok(resp) => ApiError::from_status(resp.status, &resp.body),
            Err(err) => err,
        };

        tracing::warn!(
            method = %request.method,
            path = %request.path,
            status = ?error.status(),
            error = %error,
            "api error"
        );
        for hook in &self.inner.error_hooks {
            hook.on_error(&request, &error);
        }
        Err(error)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await.map(|_| ())
    }

    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::post(path)).await.map(|_| ())
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PUT, path).json(body)?)
            .await?
            .json()
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::PATCH, path).json(body)?)
            .await?
            .json()
    }

    pub async fn patch_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::new(Method::PATCH, path)).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::new(Method::DELETE, path))
            .await
            .map(|_| ())
    }
}
