use std::io::Read;
use std::time::Instant;

use thiserror::Error;
use tiny_http::Request;

use ferrite_style::{ErrorKind, DEFAULT_BLENDING_RATIO};

use crate::routes::{jpeg_response, json_error, HttpResponse};
use crate::state::AppState;
use crate::util::multipart::{extract_boundary, field_bytes, parse_parts, text_field};

/// Why a `POST /style` request was rejected before reaching the pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("expected a multipart/form-data request")]
    NotMultipart,
    #[error("multipart boundary is missing")]
    MissingBoundary,
    #[error("missing form field '{0}'")]
    MissingField(&'static str),
    #[error("blending_ratio {0:?} is not a finite number")]
    BadRatio(String),
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Read(String),
}

impl FormError {
    pub fn status(&self) -> u16 {
        match self {
            FormError::TooLarge { .. } => 413,
            _ => 400,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FormError::TooLarge { .. } => "payload_too_large",
            _ => "bad_request",
        }
    }
}

/// The fields of a `POST /style` upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleForm {
    pub content_image:  Vec<u8>,
    pub style_image:    Vec<u8>,
    pub blending_ratio: f32,
}

impl StyleForm {
    /// `content_image` and `style_image` are required; `blending_ratio`
    /// defaults to 1.0 when absent or blank and is otherwise taken as-is.
    pub fn parse(body: &[u8], boundary: &str) -> Result<StyleForm, FormError> {
        let parts = parse_parts(body, boundary);
        let content_image = field_bytes(&parts, "content_image")
            .ok_or(FormError::MissingField("content_image"))?;
        let style_image = field_bytes(&parts, "style_image")
            .ok_or(FormError::MissingField("style_image"))?;

        let blending_ratio = match text_field(&parts, "blending_ratio") {
            Some(raw) if !raw.is_empty() => match raw.parse::<f32>() {
                Ok(ratio) if ratio.is_finite() => ratio,
                _ => return Err(FormError::BadRatio(raw)),
            },
            _ => DEFAULT_BLENDING_RATIO,
        };

        Ok(StyleForm {
            content_image: content_image.to_vec(),
            style_image: style_image.to_vec(),
            blending_ratio,
        })
    }
}

/// HTTP status for a pipeline failure: bad uploads are the client's fault,
/// everything else is ours.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Decode => 400,
        ErrorKind::Preprocess
        | ErrorKind::Inference
        | ErrorKind::Encode
        | ErrorKind::Config
        | ErrorKind::Io => 500,
    }
}

// ---------------------------------------------------------------------------
// POST /style
// ---------------------------------------------------------------------------

pub fn handle(request: &mut Request, state: &AppState) -> HttpResponse {
    let started = Instant::now();

    let form = match read_form(request, state.max_upload_bytes) {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "rejected style request");
            return json_error(e.status(), e.kind(), &e.to_string());
        }
    };

    match state.pipeline.apply_style(&form.content_image, &form.style_image, form.blending_ratio) {
        Ok(jpeg) => {
            tracing::info!(
                ratio = form.blending_ratio,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "served stylized image"
            );
            jpeg_response(jpeg)
        }
        Err(e) => {
            let status = status_for(e.kind());
            if status >= 500 {
                tracing::error!(kind = e.kind().as_str(), error = %e, "style transfer failed");
            } else {
                tracing::warn!(kind = e.kind().as_str(), error = %e, "style transfer rejected input");
            }
            json_error(status, e.kind().as_str(), &e.to_string())
        }
    }
}

fn read_form(request: &mut Request, limit: usize) -> Result<StyleForm, FormError> {
    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    if !content_type.to_ascii_lowercase().starts_with("multipart/form-data") {
        return Err(FormError::NotMultipart);
    }
    let boundary = extract_boundary(&content_type).ok_or(FormError::MissingBoundary)?;

    if request.body_length().map_or(false, |len| len > limit) {
        return Err(FormError::TooLarge { limit });
    }
    let body = read_limited(request.as_reader(), limit)?;
    StyleForm::parse(&body, &boundary)
}

/// Reads at most `limit` bytes, failing instead of truncating.
pub fn read_limited<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, FormError> {
    let mut body = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| FormError::Read(e.to_string()))?;
    if body.len() > limit {
        return Err(FormError::TooLarge { limit });
    }
    Ok(body)
}
