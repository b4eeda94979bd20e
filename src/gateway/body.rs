//! Body handling by declared content type.
//!
//! The content type is inspected once per request and turned into a
//! [`BodyEncoding`]; reading the inbound body yields the matching
//! [`OutboundBody`] variant, which knows how to attach itself (and fix up
//! `content-type`) on the upstream request.
//!
//! | Encoding   | Inbound                 | Outbound content-type            |
//! |------------|-------------------------|----------------------------------|
//! | Multipart  | parsed into fields      | recomputed by the client         |
//! | Json       | raw bytes               | `application/json`               |
//! | UrlEncoded | raw bytes               | `application/x-www-form-urlencoded` |
//! | Raw        | raw bytes               | original, if any                 |

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
};
use reqwest::multipart::{Form, Part};

use crate::error::GatewayError;

const JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Body variant chosen from the inbound `content-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Multipart,
    Json,
    UrlEncoded,
    Raw,
}

impl BodyEncoding {
    /// Classify a `content-type` value. Matching is a case-insensitive
    /// substring test, so parameters like `charset` are ignored.
    pub fn from_content_type(content_type: Option<&HeaderValue>) -> Self {
        let value = match content_type.and_then(|v| v.to_str().ok()) {
            Some(v) => v.to_ascii_lowercase(),
            None => return BodyEncoding::Raw,
        };

        if value.contains(MULTIPART) {
            BodyEncoding::Multipart
        } else if value.contains(JSON) {
            BodyEncoding::Json
        } else if value.contains(FORM_URLENCODED) {
            BodyEncoding::UrlEncoded
        } else {
            BodyEncoding::Raw
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyEncoding::Multipart => "multipart",
            BodyEncoding::Json => "json",
            BodyEncoding::UrlEncoded => "urlencoded",
            BodyEncoding::Raw => "raw",
        }
    }
}

impl std::fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a body is read and forwarded for this method.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

/// One field of a parsed multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Body to send upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Empty,
    Multipart(Vec<FormField>),
    Json(Bytes),
    UrlEncoded(Bytes),
    Raw {
        bytes: Bytes,
        content_type: Option<HeaderValue>,
    },
}

impl OutboundBody {
    /// Read the inbound body according to `encoding`.
    ///
    /// Body size is bounded by the router's `DefaultBodyLimit`.
    pub async fn read(request: Request<Body>, encoding: BodyEncoding) -> Result<Self, GatewayError> {
        if !carries_body(request.method()) {
            return Ok(OutboundBody::Empty);
        }

        match encoding {
            BodyEncoding::Multipart => read_multipart(request).await.map(OutboundBody::Multipart),
            BodyEncoding::Json => read_bytes(request).await.map(OutboundBody::Json),
            BodyEncoding::UrlEncoded => read_bytes(request).await.map(OutboundBody::UrlEncoded),
            BodyEncoding::Raw => {
                let content_type = request.headers().get(header::CONTENT_TYPE).cloned();
                let bytes = read_bytes(request).await?;
                Ok(OutboundBody::Raw { bytes, content_type })
            }
        }
    }

    /// Attach this body to the upstream request, adjusting `content-type` in
    /// `headers` to match.
    pub fn attach(
        self,
        builder: reqwest::RequestBuilder,
        mut headers: HeaderMap,
    ) -> Result<reqwest::RequestBuilder, GatewayError> {
        let builder = match self {
            OutboundBody::Empty => builder.headers(headers),
            OutboundBody::Multipart(fields) => {
                headers.remove(header::CONTENT_TYPE);
                let form = build_form(fields)?;
                builder.headers(headers).multipart(form)
            }
            OutboundBody::Json(bytes) => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
                builder.headers(headers).body(bytes)
            }
            OutboundBody::UrlEncoded(bytes) => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
                builder.headers(headers).body(bytes)
            }
            OutboundBody::Raw { bytes, content_type } => {
                headers.remove(header::CONTENT_TYPE);
                if let Some(content_type) = content_type {
                    headers.insert(header::CONTENT_TYPE, content_type);
                }
                builder.headers(headers).body(bytes)
            }
        };
        Ok(builder)
    }
}

async fn read_bytes(request: Request<Body>) -> Result<Bytes, GatewayError> {
    Bytes::from_request(request, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::BodyTooLarge
        } else {
            GatewayError::BodyRead(rejection.body_text())
        }
    })
}

async fn read_multipart(request: Request<Body>) -> Result<Vec<FormField>, GatewayError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| GatewayError::MalformedMultipart(rejection.body_text()))?;

    let mut fields = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e.status(), e.body_text())),
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text()))?;

        fields.push(FormField { name, file_name, content_type, data });
    }
    Ok(fields)
}

fn multipart_error(status: StatusCode, detail: String) -> GatewayError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::BodyTooLarge
    } else {
        GatewayError::MalformedMultipart(detail)
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, GatewayError> {
    let mut form = Form::new();
    for field in fields {
        let mut part = Part::bytes(field.data.to_vec());
        if let Some(file_name) = field.file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = field.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| GatewayError::MalformedMultipart(e.to_string()))?;
        }
        form = form.part(field.name, part);
    }
    Ok(form)
}
