use crate::transport::UpstreamError;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ALLOW, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Headers present on every proxy response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, OPTIONS"),
    ("access-control-allow-headers", "Authorization"),
];

/// JSON body returned when the proxy cannot produce upstream data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

impl From<&UpstreamError> for ErrorBody {
    fn from(err: &UpstreamError) -> Self {
        Self {
            error: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ProxyResponse {
    fn with_cors(status: StatusCode, body: ResponseBody) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in CORS_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        if matches!(body, ResponseBody::Json(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::with_cors(status, ResponseBody::Empty)
    }

    pub fn json(status: StatusCode, value: Value) -> Self {
        Self::with_cors(status, ResponseBody::Json(value))
    }

    pub fn error(status: StatusCode, body: ErrorBody) -> Self {
        // ErrorBody has only string and JSON fields; serialization cannot fail.
        let value = serde_json::to_value(body).unwrap_or(Value::Null);
        Self::json(status, value)
    }

    pub fn upstream_error(err: &UpstreamError) -> Self {
        let status = StatusCode::from_u16(err.client_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::error(status, ErrorBody::from(err))
    }

    pub fn method_not_allowed() -> Self {
        let mut resp = Self::error(
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new("Method not allowed"),
        );
        resp.headers
            .insert(ALLOW, HeaderValue::from_static("GET, OPTIONS"));
        resp
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, ErrorBody::new("Not found"))
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Empty => None,
        }
    }

    pub fn body_bytes(&self) -> Bytes {
        match &self.body {
            ResponseBody::Empty => Bytes::new(),
            ResponseBody::Json(v) => Bytes::from(v.to_string()),
        }
    }
}
