//! HTTP client for the Consty PHP API.
//!
//! Every data operation in the app goes through [`ApiClient`]: the backend
//! owns all business logic and persistence, this side only mirrors shapes.
//! Requests ride on one blocking client with a cookie store so the PHP
//! session cookie accompanies every call.

use std::path::PathBuf;

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use crate::model::{DashboardStats, Session, value_i64};

/// Failures are either transport problems (network, malformed JSON) or an
/// error the server reported in its `{error}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("{0}")]
    Server(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Request payload. File uploads (signup photo, profile photo, documents)
/// go as multipart form data, everything else as JSON.
#[derive(Debug, Clone)]
pub enum Body {
    None,
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        file: Option<(String, PathBuf)>,
    },
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the request contract and the wire. Production uses
/// [`HttpTransport`]; tests substitute a recording fake.
pub trait ApiTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ApiTransport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let url = format!("{}/{}", self.base_url, request.path);
        debug!(method = request.method.as_str(), %url, "api request");

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        let builder = match &request.body {
            Body::None => builder,
            Body::Json(payload) => builder.json(payload),
            Body::Multipart { fields, file } => {
                let mut form = reqwest::blocking::multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                if let Some((part, path)) = file {
                    form = form
                        .file(part.clone(), path)
                        .map_err(|e| ApiError::Network(format!("could not read upload: {e}")))?;
                }
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(status, bytes = body.len(), "api response");

        Ok(RawResponse { status, body })
    }
}

pub struct ApiClient {
    transport: Box<dyn ApiTransport>,
}

impl ApiClient {
    pub fn new(transport: Box<dyn ApiTransport>) -> Self {
        ApiClient { transport }
    }

    pub fn over_http(base_url: &str) -> ApiResult<Self> {
        Ok(ApiClient::new(Box::new(HttpTransport::new(base_url)?)))
    }

    /// Send a request and apply the envelope rules: an `{error}` key wins
    /// at any status, a non-success status without one gets a generic
    /// message, and anything unparseable is a parse failure.
    pub fn submit(&self, method: Method, path: &str, body: Body) -> ApiResult<Value> {
        let raw = self.transport.send(&ApiRequest {
            method,
            path: path.to_string(),
            body,
        })?;

        let parsed: Result<Value, _> = serde_json::from_str(&raw.body);
        if let Ok(value) = &parsed {
            if let Some(message) = value.get("error").and_then(Value::as_str) {
                return Err(ApiError::Server(message.to_string()));
            }
        }
        if !(200..300).contains(&raw.status) {
            return Err(ApiError::Server(format!(
                "Request failed (HTTP {})",
                raw.status
            )));
        }
        parsed.map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let payload = json!({ "username": username, "password": password });
        let value = self.submit(Method::Post, "login.php", Body::Json(payload))?;
        parse_session(&value)
    }

    pub fn signup(
        &self,
        fields: Vec<(String, String)>,
        photo: Option<PathBuf>,
    ) -> ApiResult<Session> {
        let body = Body::Multipart {
            fields,
            file: photo.map(|path| ("photo".to_string(), path)),
        };
        let value = self.submit(Method::Post, "signup.php", body)?;
        parse_session(&value)
    }

    /// Fetch an entity collection. The PHP endpoints are inconsistent about
    /// envelopes: some return a bare array, some wrap it in `{data: [...]}`.
    pub fn fetch_list(&self, endpoint: &str) -> ApiResult<Vec<Value>> {
        let value = self.submit(Method::Get, endpoint, Body::None)?;
        match value {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => Ok(rows),
                _ => Err(ApiError::Parse(format!("expected a list from {endpoint}"))),
            },
            _ => Err(ApiError::Parse(format!("expected a list from {endpoint}"))),
        }
    }

    pub fn create(&self, endpoint: &str, payload: Map<String, Value>) -> ApiResult<()> {
        self.submit(Method::Post, endpoint, Body::Json(Value::Object(payload)))?;
        Ok(())
    }

    /// Edits always go as PATCH with the record id in the payload.
    pub fn update(&self, endpoint: &str, payload: Map<String, Value>) -> ApiResult<()> {
        self.submit(Method::Patch, endpoint, Body::Json(Value::Object(payload)))?;
        Ok(())
    }

    /// Deletes carry a JSON body of `{id}`, matching the PHP contract.
    pub fn delete(&self, endpoint: &str, id: i64) -> ApiResult<()> {
        self.submit(Method::Delete, endpoint, Body::Json(json!({ "id": id })))?;
        Ok(())
    }

    pub fn dashboard(&self) -> ApiResult<DashboardStats> {
        let value = self.submit(Method::Get, "dashboard.php", Body::None)?;
        serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Change the display name, optionally replacing the profile photo.
    /// Returns the server's view of the updated record.
    pub fn update_profile(
        &self,
        id: i64,
        username: &str,
        photo: Option<PathBuf>,
    ) -> ApiResult<Value> {
        let body = match photo {
            Some(path) => Body::Multipart {
                fields: vec![
                    ("id".to_string(), id.to_string()),
                    ("username".to_string(), username.to_string()),
                ],
                file: Some(("photo".to_string(), path)),
            },
            None => Body::Json(json!({ "id": id, "username": username })),
        };
        self.submit(Method::Patch, "profile.php", body)
    }

    pub fn update_settings(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        self.submit(
            Method::Patch,
            "settings.php",
            Body::Json(json!({
                "id": id,
                "current_password": current_password,
                "new_password": new_password,
            })),
        )?;
        Ok(())
    }
}

/// Build a [`Session`] from a login/signup response. The id may arrive as a
/// number or a quoted string; a missing role stays missing.
pub fn parse_session(value: &Value) -> ApiResult<Session> {
    let id = value
        .get("id")
        .and_then(value_i64)
        .ok_or_else(|| ApiError::Parse("login response is missing an id".to_string()))?;
    let username = value
        .get("username")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Parse("login response is missing a username".to_string()))?
        .to_string();
    let role = value
        .get("role")
        .and_then(Value::as_str)
        .map(str::to_string);
    let photo = value
        .get("photo")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Session {
        id,
        username,
        role,
        photo,
    })
}
