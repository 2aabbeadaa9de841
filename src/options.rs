use std::{future::Future, ops::Deref};

use async_graphql::{
    futures_util::future::BoxFuture, parser::types::ExecutableDocument, Schema, ServerError,
};
use lambda_http::{Error, Request as LambdaRequest};
use serde_json::{Map, Value};

use crate::{error::RequestError, params::RequestParameters};

/// Extra validation over the parsed document; any violation fails the
/// request with 400 before execution.
pub type ExtraValidationFn = Box<dyn Fn(&ExecutableDocument) -> Vec<ServerError> + Send + Sync>;

/// Hook for enriching the engine request before execution, e.g. attaching
/// per-request context data via [`async_graphql::Request::data`].
pub type DecorateRequestFn =
    Box<dyn Fn(async_graphql::Request) -> async_graphql::Request + Send + Sync>;

/// Maps one engine error to its JSON form in the response body.
pub type FormatErrorFn = Box<dyn Fn(&ServerError) -> Value + Send + Sync>;

/// Computes response extensions after execution; a returned map is merged
/// into the envelope's `extensions`.
pub type ExtensionsFn =
    Box<dyn Fn(&ExtensionsContext<'_>) -> Option<Map<String, Value>> + Send + Sync>;

/// What the extensions callback gets to look at.
///
/// There is no separate context value here: per-request context data lives
/// on the engine request, installed through
/// [`GraphQLOptions::decorate_request`] and visible to resolvers via
/// [`async_graphql::Context`].
pub struct ExtensionsContext<'a> {
    /// The parsed document that was executed.
    pub document: &'a ExecutableDocument,
    /// Decoded variable values, if any.
    pub variables: Option<&'a Map<String, Value>>,
    /// Requested operation name, if any.
    pub operation_name: Option<&'a str>,
    /// The engine's execution result.
    pub result: &'a async_graphql::Response,
}

/// Configuration consumed by the handlers, built around a schema.
///
/// Behavior hooks are plain optional functions with documented defaults,
/// not trait objects the caller must implement.
pub struct GraphQLOptions<Query, Mutation, Subscription> {
    pub(crate) schema: Schema<Query, Mutation, Subscription>,
    pub(crate) pretty: bool,
    pub(crate) graphiql: bool,
    pub(crate) extra_validation: Option<ExtraValidationFn>,
    pub(crate) decorate_request: Option<DecorateRequestFn>,
    pub(crate) format_error: Option<FormatErrorFn>,
    pub(crate) extensions: Option<ExtensionsFn>,
    pub(crate) legacy_error_formatter: bool,
}

impl<Query, Mutation, Subscription> GraphQLOptions<Query, Mutation, Subscription> {
    /// Options with default behavior for the given schema: compact JSON,
    /// no explorer, no extra hooks.
    pub fn new(schema: Schema<Query, Mutation, Subscription>) -> Self {
        Self {
            schema,
            pretty: false,
            graphiql: false,
            extra_validation: None,
            decorate_request: None,
            format_error: None,
            extensions: None,
            legacy_error_formatter: false,
        }
    }

    /// Indent the serialized JSON response.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Allow the GraphiQL explorer for HTML-preferring requests.
    #[must_use]
    pub fn graphiql(mut self, graphiql: bool) -> Self {
        self.graphiql = graphiql;
        self
    }

    /// Run extra validation rules over the parsed document.
    #[must_use]
    pub fn extra_validation(
        mut self,
        rules: impl Fn(&ExecutableDocument) -> Vec<ServerError> + Send + Sync + 'static,
    ) -> Self {
        self.extra_validation = Some(Box::new(rules));
        self
    }

    /// Rewrite the engine request before execution.
    #[must_use]
    pub fn decorate_request(
        mut self,
        decorate: impl Fn(async_graphql::Request) -> async_graphql::Request + Send + Sync + 'static,
    ) -> Self {
        self.decorate_request = Some(Box::new(decorate));
        self
    }

    /// Replace the default error formatter. The default serializes the
    /// engine error, which already matches the GraphQL spec's
    /// `{message, locations, path, extensions}` shape.
    #[must_use]
    pub fn format_error(
        mut self,
        format: impl Fn(&ServerError) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.format_error = Some(Box::new(format));
        self
    }

    /// Compute response extensions after execution.
    #[must_use]
    pub fn extensions(
        mut self,
        extensions: impl Fn(&ExtensionsContext<'_>) -> Option<Map<String, Value>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.extensions = Some(Box::new(extensions));
        self
    }

    /// Former name of [`GraphQLOptions::format_error`]; using it logs a
    /// warning on every request.
    #[deprecated(note = "renamed to `format_error`")]
    #[must_use]
    pub fn error_formatter(
        mut self,
        format: impl Fn(&ServerError) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.legacy_error_formatter = true;
        self.format_error = Some(Box::new(format));
        self
    }
}

/// Arguments handed to an options factory.
pub struct OptionsContext<'a> {
    /// The inbound HTTP request; `None` for the direct-event binding.
    pub request: Option<&'a LambdaRequest>,
    /// Parameters already extracted from the request.
    pub params: &'a RequestParameters,
}

type OptionsFactory<Query, Mutation, Subscription> = Box<
    dyn for<'a> Fn(
            OptionsContext<'a>,
        ) -> BoxFuture<'a, Result<GraphQLOptions<Query, Mutation, Subscription>, Error>>
        + Send
        + Sync,
>;

/// Handler configuration: fixed up front, or computed per request.
pub enum OptionsSource<Query, Mutation, Subscription> {
    /// One configuration shared by every request.
    Static(GraphQLOptions<Query, Mutation, Subscription>),
    /// Configuration recomputed per request from the transport request and
    /// the parsed parameters.
    Factory(OptionsFactory<Query, Mutation, Subscription>),
}

impl<Query, Mutation, Subscription> OptionsSource<Query, Mutation, Subscription> {
    /// Wraps a factory closure without the boxing noise at call sites.
    ///
    /// The returned future cannot borrow from the context; clone what the
    /// computation needs before going async, or build the boxed
    /// [`OptionsSource::Factory`] variant directly.
    pub fn factory<F, Fut>(factory: F) -> Self
    where
        F: Fn(OptionsContext<'_>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<GraphQLOptions<Query, Mutation, Subscription>, Error>>
            + Send
            + 'static,
    {
        Self::Factory(Box::new(move |context: OptionsContext<'_>| {
            Box::pin(factory(context))
        }))
    }

    /// Resolves the configuration once for this request. A factory error
    /// becomes an internal failure (500).
    pub(crate) async fn resolve<'a>(
        &'a self,
        request: Option<&'a LambdaRequest>,
        params: &'a RequestParameters,
    ) -> Result<ResolvedOptions<'a, Query, Mutation, Subscription>, RequestError> {
        let options = match self {
            Self::Static(options) => ResolvedOptions::Borrowed(options),
            Self::Factory(factory) => factory(OptionsContext { request, params })
                .await
                .map(ResolvedOptions::Owned)
                .map_err(|err| {
                    RequestError::Internal(format!("GraphQL options function failed: {err}"))
                })?,
        };
        if options.legacy_error_formatter {
            tracing::warn!("`error_formatter` is deprecated, use `format_error` instead");
        }
        Ok(options)
    }
}

impl<Query, Mutation, Subscription> From<GraphQLOptions<Query, Mutation, Subscription>>
    for OptionsSource<Query, Mutation, Subscription>
{
    fn from(options: GraphQLOptions<Query, Mutation, Subscription>) -> Self {
        Self::Static(options)
    }
}

pub(crate) enum ResolvedOptions<'a, Query, Mutation, Subscription> {
    Borrowed(&'a GraphQLOptions<Query, Mutation, Subscription>),
    Owned(GraphQLOptions<Query, Mutation, Subscription>),
}

impl<Query, Mutation, Subscription> Deref for ResolvedOptions<'_, Query, Mutation, Subscription> {
    type Target = GraphQLOptions<Query, Mutation, Subscription>;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(options) => options,
            Self::Owned(options) => options,
        }
    }
}
