use async_graphql::{
    parser::{
        parse_query,
        types::{DocumentOperations, ExecutableDocument, OperationType},
    },
    ObjectType, SubscriptionType, Variables,
};
use lambda_http::http::Method;
use serde_json::Value;

use crate::{
    error::RequestError,
    options::{ExtensionsContext, GraphQLOptions},
    params::RequestParameters,
    response::GraphQLResponse,
};

/// What a transport binding is capable of. Both bindings run the one
/// pipeline below, parameterized by this descriptor, rather than each
/// carrying its own copy of the sequence.
pub(crate) struct TransportCaps {
    /// HTTP method, when the transport has one.
    pub method: Option<Method>,
    /// The explorer may be rendered in place of a JSON error.
    pub can_display_graphiql: bool,
}

pub(crate) enum Outcome {
    /// The engine ran. `request_failure` marks request-level errors, which
    /// the HTTP binding reports as 400.
    Executed {
        envelope: GraphQLResponse,
        request_failure: bool,
    },
    /// Short-circuit to the interactive explorer.
    Graphiql,
}

/// The sequential request pipeline: method check, query presence, parse,
/// caller rules, read-only guard, execute, extensions. The first failure
/// short-circuits into a [`RequestError`].
pub(crate) async fn run<Query, Mutation, Subscription>(
    params: &RequestParameters,
    options: &GraphQLOptions<Query, Mutation, Subscription>,
    caps: &TransportCaps,
) -> Result<Outcome, RequestError>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    if let Some(method) = &caps.method {
        if *method != Method::GET && *method != Method::POST {
            return Err(RequestError::MethodNotAllowed);
        }
    }

    let Some(query) = params.query.as_deref() else {
        if caps.can_display_graphiql {
            return Ok(Outcome::Graphiql);
        }
        return Err(RequestError::MissingQuery);
    };

    let document = parse_query(query).map_err(|err| RequestError::Syntax(err.into()))?;

    if let Some(validate) = &options.extra_validation {
        let violations = validate(&document);
        if !violations.is_empty() {
            return Err(RequestError::Validation(violations));
        }
    }

    if caps.method.as_ref() == Some(&Method::GET) {
        if let Some(kind) = operation_kind(&document, params.operation_name.as_deref()) {
            if kind != OperationType::Query {
                if caps.can_display_graphiql {
                    return Ok(Outcome::Graphiql);
                }
                return Err(RequestError::OperationDisallowed(kind));
            }
        }
    }

    let mut request = async_graphql::Request::new(query);
    if let Some(name) = &params.operation_name {
        request = request.operation_name(name);
    }
    if let Some(variables) = &params.variables {
        request = request.variables(Variables::from_json(Value::Object(variables.clone())));
    }
    if let Some(decorate) = &options.decorate_request {
        request = decorate(request);
    }

    let result = options.schema.execute(request).await;
    let request_failure = is_request_failure(&result);
    tracing::debug!(errors = result.errors.len(), request_failure, "executed");

    let mut envelope =
        GraphQLResponse::from_execution(&result, request_failure, options.format_error.as_deref());

    if let Some(extensions) = &options.extensions {
        let context = ExtensionsContext {
            document: &document,
            variables: params.variables.as_ref(),
            operation_name: params.operation_name.as_deref(),
            result: &result,
        };
        if let Some(extra) = extensions(&context) {
            envelope.merge_extensions(extra);
        }
    }

    Ok(Outcome::Executed {
        envelope,
        request_failure,
    })
}

/// Kind of the operation the request asks for, or `None` when the name is
/// ambiguous or unknown, in which case the executor reports it.
fn operation_kind(document: &ExecutableDocument, name: Option<&str>) -> Option<OperationType> {
    match (&document.operations, name) {
        (DocumentOperations::Single(operation), _) => Some(operation.node.ty),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, operation)| operation.node.ty),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => {
            operations.values().next().map(|operation| operation.node.ty)
        }
        _ => None,
    }
}

/// Request errors abort execution before any field runs; per the GraphQL
/// spec they carry no `data` key and no path. Field errors keep their path
/// and leave (possibly null) data in place, so they stay 200.
fn is_request_failure(result: &async_graphql::Response) -> bool {
    !result.errors.is_empty()
        && result.data == async_graphql::Value::Null
        && result.errors.iter().all(|err| err.path.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(query: &str, name: Option<&str>) -> Option<OperationType> {
        operation_kind(&parse_query(query).unwrap(), name)
    }

    #[test]
    fn single_operation_kind() {
        assert_eq!(kind_of("{ hello }", None), Some(OperationType::Query));
        assert_eq!(
            kind_of("mutation { bump }", None),
            Some(OperationType::Mutation)
        );
    }

    #[test]
    fn named_operation_is_looked_up() {
        let doc = "query A { hello } mutation B { bump }";
        assert_eq!(kind_of(doc, Some("A")), Some(OperationType::Query));
        assert_eq!(kind_of(doc, Some("B")), Some(OperationType::Mutation));
        assert_eq!(kind_of(doc, Some("C")), None);
        assert_eq!(kind_of(doc, None), None);
    }

    #[test]
    fn sole_named_operation_needs_no_name() {
        assert_eq!(
            kind_of("mutation Only { bump }", None),
            Some(OperationType::Mutation)
        );
    }

    #[test]
    fn request_failures_have_no_data_and_no_paths() {
        use async_graphql::ServerError;

        let failed =
            async_graphql::Response::from_errors(vec![ServerError::new("unknown field", None)]);
        assert!(is_request_failure(&failed));

        let ok = async_graphql::Response::new(async_graphql::Value::Null);
        assert!(!is_request_failure(&ok));
    }
}
