use async_graphql::ServerError;
use lambda_http::{
    http::{
        header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    Body, Response,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RequestError;

/// The JSON envelope both bindings produce.
///
/// Always well-formed, whether execution succeeded or the pipeline failed
/// on the way there; absent members are omitted from the serialized form
/// rather than emitted as `null`.
#[derive(Debug, Default, Serialize)]
pub struct GraphQLResponse {
    /// Execution result data. Omitted entirely on request failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Formatted errors. Omitted when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    /// Engine extensions, merged with the extensions callback's output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

pub(crate) type FormatErrorRef<'a> = Option<&'a (dyn Fn(&ServerError) -> Value + Send + Sync)>;

impl GraphQLResponse {
    pub(crate) fn from_execution(
        result: &async_graphql::Response,
        request_failure: bool,
        format: FormatErrorRef<'_>,
    ) -> Self {
        let data =
            (!request_failure).then(|| serde_json::to_value(&result.data).unwrap_or(Value::Null));
        let errors = (!result.errors.is_empty()).then(|| {
            result
                .errors
                .iter()
                .map(|err| format_one(err, format))
                .collect()
        });
        let extensions = (!result.extensions.is_empty()).then(|| {
            result
                .extensions
                .iter()
                .map(|(key, value)| {
                    (
                        key.clone(),
                        serde_json::to_value(value).unwrap_or(Value::Null),
                    )
                })
                .collect()
        });
        Self {
            data,
            errors,
            extensions,
        }
    }

    pub(crate) fn from_error(error: RequestError, format: FormatErrorRef<'_>) -> Self {
        let errors = error
            .into_graphql_errors()
            .iter()
            .map(|err| format_one(err, format))
            .collect();
        Self {
            data: None,
            errors: Some(errors),
            extensions: None,
        }
    }

    pub(crate) fn merge_extensions(&mut self, extra: Map<String, Value>) {
        self.extensions.get_or_insert_with(Map::new).extend(extra);
    }
}

/// The default formatter serializes the engine error, which already matches
/// the spec's `{message, locations, path, extensions}` shape.
fn format_one(error: &ServerError, format: FormatErrorRef<'_>) -> Value {
    match format {
        Some(format) => format(error),
        None => {
            serde_json::to_value(error).unwrap_or_else(|_| Value::String(error.message.clone()))
        }
    }
}

pub(crate) fn json_response(
    envelope: &GraphQLResponse,
    status: StatusCode,
    allow: Option<&'static str>,
    pretty: bool,
) -> Result<Response<Body>, lambda_http::Error> {
    let body = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .header(CONTENT_LENGTH, body.len());
    if let Some(allow) = allow {
        builder = builder.header(ALLOW, allow);
    }
    Ok(builder.body(Body::from(body))?)
}

pub(crate) fn html_response(page: String) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, page.len())
        .body(Body::from(page))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_envelope_omits_errors() {
        let result = async_graphql::Response::new(async_graphql::Value::Null);
        let envelope = GraphQLResponse::from_execution(&result, false, None);
        let serialized = serde_json::to_value(&envelope).unwrap();
        assert_eq!(serialized, json!({ "data": null }));
    }

    #[test]
    fn failure_envelope_has_errors_and_no_data() {
        let envelope = GraphQLResponse::from_error(RequestError::MissingQuery, None);
        let serialized = serde_json::to_value(&envelope).unwrap();
        assert!(serialized.get("data").is_none());
        assert_eq!(
            serialized["errors"][0]["message"],
            "Must provide query string."
        );
    }

    #[test]
    fn custom_formatter_replaces_the_default() {
        let format = |err: &ServerError| json!({ "msg": err.message });
        let envelope = GraphQLResponse::from_error(RequestError::MissingQuery, Some(&format));
        let serialized = serde_json::to_value(&envelope).unwrap();
        assert_eq!(serialized["errors"][0]["msg"], "Must provide query string.");
    }

    #[test]
    fn pretty_and_compact_differ_only_in_whitespace() {
        let result = async_graphql::Response::from_errors(vec![ServerError::new("nope", None)]);
        let envelope = GraphQLResponse::from_execution(&result, true, None);
        let compact = serde_json::to_string(&envelope).unwrap();
        let pretty = serde_json::to_string_pretty(&envelope).unwrap();
        assert_ne!(compact, pretty);
        assert_eq!(
            serde_json::from_str::<Value>(&compact).unwrap(),
            serde_json::from_str::<Value>(&pretty).unwrap()
        );
    }

    #[test]
    fn merged_extensions_extend_engine_extensions() {
        let mut envelope = GraphQLResponse::default();
        envelope.merge_extensions(json!({ "runTime": 42 }).as_object().unwrap().clone());
        assert_eq!(envelope.extensions.unwrap()["runTime"], json!(42));
    }
}
