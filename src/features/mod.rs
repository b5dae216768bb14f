//! The board's feature controllers.

pub mod anonymous_shout;
pub mod authenticated_consumer;
pub mod authenticated_shout;
pub mod moment;

use crate::auth::RoleGrants;
use crate::config::FeaturesConfig;
use crate::model::{Consumer, Shout};
use anonymous_shout::AnonymousShoutService;
use authenticated_shout::AuthenticatedShoutService;
use axum::Router;
use crud_framework::{Anonymous, Authenticated, Repository, RestController, TransactionManager};
use moment::MomentClock;
use std::sync::Arc;

/// Stores and shared state the features are built on.
#[derive(Clone)]
pub struct FeatureContext {
    pub shouts: Repository<Shout>,
    pub consumers: Repository<Consumer>,
    pub grants: RoleGrants,
    pub transactions: TransactionManager,
}

/// Routes of every feature, each under its own base path.
pub fn routes(context: FeatureContext, config: &FeaturesConfig) -> Router {
    let clock = MomentClock::new();

    let anonymous_shouts = RestController::<Anonymous, Shout>::new(
        AnonymousShoutService::new(context.shouts.clone(), clock.clone()),
        context.transactions.clone(),
    );
    let authenticated_shouts = RestController::<Authenticated, Shout>::new(
        AuthenticatedShoutService::new(context.shouts, clock, &config.spam_words),
        context.transactions.clone(),
    );
    let consumers =
        authenticated_consumer::controller(context.consumers, context.grants, context.transactions);

    Router::new()
        .merge(Arc::new(anonymous_shouts).routes(anonymous_shout::BASE_PATH))
        .merge(Arc::new(authenticated_shouts).routes(authenticated_shout::BASE_PATH))
        .merge(Arc::new(consumers).routes(authenticated_consumer::BASE_PATH))
}
