use crate::config::{lookup_or_default, ConfigSource, DEFAULT_NAME, NAME_KEY};
use crate::error::HandlerError;
use lambda_runtime::{tracing, Context, Error, LambdaEvent};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The inbound call as forwarded by the host. Hosts populate as much of it
/// as they can; every field may be missing or `null`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Request {
    #[serde(alias = "httpMethod")]
    pub method: Option<String>,
    #[serde(alias = "rawPath")]
    pub path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(alias = "queryStringParameters", deserialize_with = "null_as_default")]
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn error(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entry point registered with the runtime. Never fails: every problem is
/// reported to the caller as a 5xx response.
pub async fn function_handler(
    config: Arc<dyn ConfigSource>,
    event: LambdaEvent<Option<Request>>,
) -> Result<Response, Error> {
    let LambdaEvent { payload, context } = event;
    let request = payload.unwrap_or_default();

    Ok(handle(&request, &context, config.as_ref()))
}

pub fn handle(request: &Request, context: &Context, config: &dyn ConfigSource) -> Response {
    let response = render_greeting(config)
        .map(Response::ok)
        .unwrap_or_else(HandlerError::into_response);

    if response.status_code >= 500 {
        tracing::error!(
            request_id = %context.request_id,
            status = response.status_code,
            reason = %response.body,
            "request failed"
        );
    } else {
        tracing::info!(
            request_id = %context.request_id,
            deadline_ms = context.deadline,
            method = request.method.as_deref().unwrap_or("-"),
            path = request.path.as_deref().unwrap_or("-"),
            status = response.status_code,
            "request handled"
        );
    }

    response
}

fn render_greeting(config: &dyn ConfigSource) -> Result<String, HandlerError> {
    let name = lookup_or_default(config, NAME_KEY, DEFAULT_NAME)?;

    Ok(format!("Hello, {name}!"))
}
