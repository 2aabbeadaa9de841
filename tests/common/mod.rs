#![allow(dead_code)]

use async_graphql::{EmptySubscription, Object, Schema};
use graphql_http_lambda::{GraphQLOptions, OptionsSource};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hello(&self) -> &str {
        "Hello world!"
    }

    async fn roll_dice(&self, num_dice: u32, num_sides: u32) -> Vec<u32> {
        vec![num_dice, num_sides]
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn set_message(&self, message: String) -> String {
        message
    }
}

pub type TestSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn schema() -> TestSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}

pub fn options() -> OptionsSource<QueryRoot, MutationRoot, EmptySubscription> {
    GraphQLOptions::new(schema()).into()
}
