//! Line-oriented JSON protocol.
//!
//! Every request is one JSON object on its own line, selected by its `op`
//! field. Every response is one line `{"status": <u16>, "body": <value>}`
//! where `status` follows HTTP conventions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zepartners_error::{ErrorExt, ErrorResponse, LogLevel};

use crate::{
    error::RequestError,
    registry::{Partner, PartnerId, PartnerRegistry},
};

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Register { partner: Partner },
    Get { id: PartnerId },
    Nearest { lng: f64, lat: f64 },
    Health,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Request {
    /// The `op` tag, for logs.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Get { .. } => "get",
            Self::Nearest { .. } => "nearest",
            Self::Health => "health",
        }
    }
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn created(id: &PartnerId) -> Self {
        Self {
            status: 201,
            body: json!({ "status": "created", "id": id }),
        }
    }

    pub fn error<E: ErrorExt + ?Sized>(err: &E) -> Self {
        let body = ErrorResponse::from_error(err);
        Self {
            status: body.http_status(),
            body: json!({ "code": body.code, "detail": body.detail }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Encodes the response as one newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Decodes one request line; surrounding whitespace is ignored.
pub fn parse_request(line: &[u8]) -> Result<Request, RequestError> {
    let text = std::str::from_utf8(line).map_err(|_| RequestError::InvalidUtf8)?;
    Ok(serde_json::from_str(text.trim())?)
}

fn partner_body(partner: &Partner) -> Value {
    serde_json::to_value(partner).unwrap_or(Value::Null)
}

/// Runs `request` against the registry.
///
/// Blocks on the registry lock, and `Register` does file IO while holding
/// it; async callers run this on a blocking thread.
pub fn execute(
    registry: &PartnerRegistry,
    request: Request,
) -> Response {
    let result = match request {
        Request::Register { partner } => registry.register(partner).map(|id| Response::created(&id)),
        Request::Get { id } => registry.get(&id).map(|p| Response::ok(partner_body(&p))),
        Request::Nearest { lng, lat } => registry
            .nearest(lng, lat)
            .map(|p| Response::ok(partner_body(&p))),
        Request::Health => Ok(Response::ok(json!({
            "status": "ok",
            "partners_count": registry.len(),
        }))),
    };

    result.unwrap_or_else(|err| {
        match err.status_code().log_level() {
            LogLevel::Error => tracing::error!(
                error_type = %err.type_name(),
                error = %err.log_message(),
                "Request failed"
            ),
            LogLevel::Warn => tracing::warn!(error_type = %err.type_name(), error = %err, "Request failed"),
            _ => tracing::debug!(error = %err, "Request rejected"),
        }
        Response::error(&err)
    })
}
