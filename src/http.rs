use async_graphql::{ObjectType, SubscriptionType};
use lambda_http::{http::StatusCode, Body, Error, Request as LambdaRequest, Response};

use crate::{
    error::RequestError,
    graphiql,
    options::OptionsSource,
    params,
    pipeline::{self, Outcome, TransportCaps},
    response::{self, GraphQLResponse},
};

/// Serves one GraphQL HTTP request against the configured schema.
///
/// Call this from a `lambda_http` service function. Every pipeline failure
/// comes back as a well-formed JSON response with the matching status code;
/// the `Err` arm only reports transport-level serialization problems.
pub async fn graphql_http<Query, Mutation, Subscription>(
    request: LambdaRequest,
    options: &OptionsSource<Query, Mutation, Subscription>,
) -> Result<Response<Body>, Error>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    let params = match params::extract(&request) {
        Ok(params) => params,
        Err(err) => return failure_response(err, false),
    };

    let options = match options.resolve(Some(&request), &params).await {
        Ok(options) => options,
        Err(err) => return failure_response(err, false),
    };

    let caps = TransportCaps {
        method: Some(request.method().clone()),
        can_display_graphiql: options.graphiql
            && !params.raw
            && graphiql::wants_html(request.headers()),
    };

    match pipeline::run(&params, &options, &caps).await {
        Ok(Outcome::Graphiql) => response::html_response(graphiql::render(request.uri().path())),
        // Eligible browsers get the explorer even when the request carried
        // a query; the page re-issues it against the same endpoint.
        Ok(Outcome::Executed { .. }) if caps.can_display_graphiql => {
            response::html_response(graphiql::render(request.uri().path()))
        }
        Ok(Outcome::Executed {
            envelope,
            request_failure,
        }) => {
            let status = if request_failure {
                StatusCode::BAD_REQUEST
            } else if envelope.data.is_none() && envelope.errors.is_none() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            response::json_response(&envelope, status, None, options.pretty)
        }
        Err(err) => {
            let status = err.status();
            let allow = err.allow();
            let envelope = GraphQLResponse::from_error(err, options.format_error.as_deref());
            response::json_response(&envelope, status, allow, options.pretty)
        }
    }
}

fn failure_response(err: RequestError, pretty: bool) -> Result<Response<Body>, Error> {
    let status = err.status();
    let allow = err.allow();
    let envelope = GraphQLResponse::from_error(err, None);
    response::json_response(&envelope, status, allow, pretty)
}
