use async_graphql::{ObjectType, SubscriptionType};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::RequestError,
    options::OptionsSource,
    params::{self, RequestParameters},
    pipeline::{self, Outcome, TransportCaps},
    response::GraphQLResponse,
};

/// Pre-shaped payload for the direct (non-HTTP) invocation binding.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLEvent {
    /// GraphQL source text.
    pub query: Option<String>,
    /// Variable values: an object, or a JSON-encoded string.
    pub variables: Option<Value>,
    /// Name of the operation to run when the document holds several.
    pub operation_name: Option<String>,
    /// Accepted for shape parity with the HTTP binding; there is no
    /// explorer to suppress on this transport.
    pub raw: bool,
}

impl TryFrom<GraphQLEvent> for RequestParameters {
    type Error = RequestError;

    fn try_from(event: GraphQLEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            query: event.query,
            variables: params::decode_variables(event.variables)?,
            operation_name: event.operation_name,
            raw: event.raw,
        })
    }
}

/// Serves one direct invocation.
///
/// No status code exists on this transport; every failure collapses to a
/// data-less envelope with a populated `errors` list.
pub async fn graphql_event<Query, Mutation, Subscription>(
    event: GraphQLEvent,
    options: &OptionsSource<Query, Mutation, Subscription>,
) -> GraphQLResponse
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    let params = match RequestParameters::try_from(event) {
        Ok(params) => params,
        Err(err) => return GraphQLResponse::from_error(err, None),
    };

    let options = match options.resolve(None, &params).await {
        Ok(options) => options,
        Err(err) => return GraphQLResponse::from_error(err, None),
    };

    let caps = TransportCaps {
        method: None,
        can_display_graphiql: false,
    };

    match pipeline::run(&params, &options, &caps).await {
        Ok(Outcome::Executed { envelope, .. }) => envelope,
        Ok(Outcome::Graphiql) => GraphQLResponse::from_error(RequestError::MissingQuery, None),
        Err(err) => GraphQLResponse::from_error(err, options.format_error.as_deref()),
    }
}
