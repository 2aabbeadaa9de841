use std::{borrow::Cow, collections::HashMap};

use lambda_http::{
    ext::RequestExt, http::header::CONTENT_TYPE, request::RequestContext, Body,
    Request as LambdaRequest,
};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Normalized GraphQL parameters, assembled once per request.
#[derive(Debug, Default)]
pub struct RequestParameters {
    /// GraphQL source text, if any was supplied.
    pub query: Option<String>,
    /// Decoded variable values.
    pub variables: Option<Map<String, Value>>,
    /// Name of the operation to run when the document holds several.
    pub operation_name: Option<String>,
    /// Raw output was requested, which suppresses the explorer.
    pub raw: bool,
}

const FIELDS: [&str; 4] = ["query", "variables", "operationName", "raw"];

/// Pulls parameters out of an HTTP request, URL query string winning over
/// body fields.
pub(crate) fn extract(req: &LambdaRequest) -> Result<RequestParameters, RequestError> {
    let url = url_params(req);
    let body = body_params(req)?;

    let query = url
        .get("query")
        .cloned()
        .or_else(|| body_string(&body, "query"));
    let operation_name = url
        .get("operationName")
        .cloned()
        .or_else(|| body_string(&body, "operationName"));
    let raw_variables = url
        .get("variables")
        .map(|text| Value::String(text.clone()))
        .or_else(|| body.get("variables").cloned());
    let variables = decode_variables(raw_variables)?;
    let raw = url.contains_key("raw") || body.contains_key("raw");

    Ok(RequestParameters {
        query,
        variables,
        operation_name,
        raw,
    })
}

/// Normalizes a `variables` value: objects pass through, strings are
/// JSON-decoded, anything else becomes `None`.
pub(crate) fn decode_variables(
    value: Option<Value>,
) -> Result<Option<Map<String, Value>>, RequestError> {
    match value {
        Some(Value::String(text)) => match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Ok(None),
            Err(err) => Err(RequestError::InvalidVariablesJson(err)),
        },
        Some(Value::Object(map)) => Ok(Some(map)),
        _ => Ok(None),
    }
}

fn body_string(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn url_params(req: &LambdaRequest) -> HashMap<String, String> {
    let query_map = req.query_string_parameters();
    if query_map.is_empty() {
        // Hand-built requests and function URLs carry the query string on
        // the URI only.
        return req
            .uri()
            .query()
            .and_then(|qs| serde_urlencoded::from_str(qs).ok())
            .unwrap_or_default();
    }

    // API Gateway Payload Version 2.0 doesn't follow spec.
    // See https://github.com/calavera/query-map-rs/issues/1 and
    // https://docs.aws.amazon.com/apigateway/latest/developerguide/http-api-develop-integrations-lambda.html
    let join_values = matches!(
        req.extensions().get::<RequestContext>(),
        Some(RequestContext::ApiGatewayV2(_))
    );

    let mut params = HashMap::new();
    for field in FIELDS {
        let value = if join_values {
            query_map.all(field).map(|values| values.join(","))
        } else {
            query_map.first(field).map(String::from)
        };
        if let Some(value) = value {
            params.insert(field.to_owned(), value);
        }
    }
    params
}

/// Decodes the request body into a field map, honoring `Content-Type`.
///
/// JSON objects and url-encoded forms contribute their fields;
/// `application/graphql` bodies are the query itself. Anything else is
/// treated as absent rather than rejected.
fn body_params(req: &LambdaRequest) -> Result<Map<String, Value>, RequestError> {
    let text: Cow<'_, str> = match req.body() {
        Body::Empty => return Ok(Map::new()),
        Body::Text(text) => Cow::Borrowed(text),
        Body::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => return Ok(Map::new()),
        },
    };
    if text.is_empty() {
        return Ok(Map::new());
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/graphql") {
        let mut map = Map::new();
        map.insert("query".to_owned(), Value::String(text.into_owned()));
        return Ok(map);
    }
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields: HashMap<String, String> =
            serde_urlencoded::from_str(&text).unwrap_or_default();
        return Ok(fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect());
    }
    if content_type.starts_with("application/json") {
        return match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Map::new()),
            Err(err) => Err(RequestError::InvalidBodyJson(err)),
        };
    }
    Ok(Map::new())
}
