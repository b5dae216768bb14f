use crate::auth::{attach_principal, RoleGrants, TokenAuthenticator};
use crate::config::{AppConfig, ConfigError};
use crate::features::{self, FeatureContext};
use crate::model::{Consumer, Shout};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::Router;
use crud_framework::persistence::StoreActor;
use crud_framework::{Repository, TransactionManager};
use tokio::task::{JoinError, JoinHandle};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// The running board: one store actor per entity type and the HTTP router in
/// front of them.
///
/// # Example
///
/// ```ignore
/// let system = BoardSystem::start(&AppConfig::default())?;
/// let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
/// axum::serve(listener, system.router()).await?;
///
/// system.shutdown().await?;
/// ```
pub struct BoardSystem {
    router: Router,
    shouts: Repository<Shout>,
    consumers: Repository<Consumer>,
    grants: RoleGrants,
    transactions: TransactionManager,
    handles: Vec<JoinHandle<()>>,
}

impl BoardSystem {
    /// Spawns the stores and builds the router. Must be called inside a Tokio
    /// runtime.
    pub fn start(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = config.server.allowed_origin()?;

        let (shout_store, shouts) = StoreActor::<Shout>::new(config.store.buffer_size);
        let (consumer_store, consumers) = StoreActor::<Consumer>::new(config.store.buffer_size);
        let handles = vec![
            tokio::spawn(shout_store.run()),
            tokio::spawn(consumer_store.run()),
        ];

        let grants = RoleGrants::new();
        let transactions = TransactionManager::new();
        let authenticator = TokenAuthenticator::from_config(&config.auth, grants.clone());

        let context = FeatureContext {
            shouts: shouts.clone(),
            consumers: consumers.clone(),
            grants: grants.clone(),
            transactions: transactions.clone(),
        };
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

        let router = features::routes(context, &config.features)
            .layer(from_fn_with_state(authenticator, attach_principal))
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http())
            .layer(cors);

        info!(base_url = %config.server.base_url, "Board started");
        Ok(Self {
            router,
            shouts,
            consumers,
            grants,
            transactions,
            handles,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn shouts(&self) -> &Repository<Shout> {
        &self.shouts
    }

    pub fn consumers(&self) -> &Repository<Consumer> {
        &self.consumers
    }

    pub fn grants(&self) -> &RoleGrants {
        &self.grants
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.transactions
    }

    /// Closes the stores and waits for them to drain.
    ///
    /// Every router handed out by [`BoardSystem::router`] holds repository
    /// handles; drop them first or this waits forever.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down board...");
        drop(self.router);
        drop(self.shouts);
        drop(self.consumers);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Store task failed");
                return Err(e);
            }
        }

        let stats = self.transactions.stats();
        info!(
            committed = stats.committed,
            rolled_back = stats.rolled_back,
            "Board shutdown complete"
        );
        Ok(())
    }
}
