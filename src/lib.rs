//! express-graphql style handlers for `async-graphql` on `lambda_http`.
//!
//! Two bindings over one request pipeline: [`graphql_http`] adapts a full
//! HTTP request (query string or JSON/form body, content negotiation,
//! status codes, optional GraphiQL explorer), and [`graphql_event`] adapts
//! a pre-shaped invocation payload into a plain `{data, errors}` envelope.
//! Parsing, validation, and execution belong to `async-graphql`; this crate
//! only normalizes inputs and outputs around it.
//!
//! ```no_run
//! use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
//! use graphql_http_lambda::{graphql_http, GraphQLOptions, OptionsSource};
//! use lambda_http::{run, service_fn, Error};
//!
//! struct Query;
//!
//! #[Object]
//! impl Query {
//!     async fn hello(&self) -> &str {
//!         "Hello world!"
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let schema = Schema::build(Query, EmptyMutation, EmptySubscription).finish();
//!     let options = OptionsSource::from(GraphQLOptions::new(schema).graphiql(true));
//!     run(service_fn(|event| graphql_http(event, &options))).await
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod event;
mod graphiql;
mod http;
mod options;
mod params;
mod pipeline;
mod response;

pub use error::RequestError;
pub use event::{graphql_event, GraphQLEvent};
pub use http::graphql_http;
pub use options::{
    DecorateRequestFn, ExtensionsContext, ExtensionsFn, ExtraValidationFn, FormatErrorFn,
    GraphQLOptions, OptionsContext, OptionsSource,
};
pub use params::RequestParameters;
pub use response::GraphQLResponse;
