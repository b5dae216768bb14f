//! # Command Controller
//!
//! Form-style endpoints for one `(Role, Entity)` pair. Each basic command is backed
//! by its own service and served at `{base}{command}`:
//!
//! - GET renders the entity (or entities) as unbound models. `create` and
//!   `perform` show a freshly instantiated entity; `show`, `update` and `delete`
//!   show the stored one.
//! - POST binds the request parameters onto the entity, validates it and, if no
//!   errors were found, runs the command's write hook.
//!
//! Services are checked against the command's required capabilities when they are
//! registered, so a wiring mistake fails at start-up rather than on first use.

use crate::capability::{Capabilities, Service};
use crate::error::{DispatchError, ServiceError};
use crate::http::locale;
use crate::model::Model;
use crate::outcome::{resolve, Outcome};
use crate::persistence::{entity_type, Entity, TransactionManager};
use crate::principal::Principal;
use crate::request::{Request, Response};
use crate::role::Role;
use crate::validation::Errors;
use crate::wrapper::ServiceWrapper;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BasicCommand {
    List,
    Show,
    Create,
    Update,
    Delete,
    Perform,
}

impl BasicCommand {
    pub const ALL: [BasicCommand; 6] = [
        BasicCommand::List,
        BasicCommand::Show,
        BasicCommand::Create,
        BasicCommand::Update,
        BasicCommand::Delete,
        BasicCommand::Perform,
    ];

    /// Path segment under the controller's base path.
    pub fn path(self) -> &'static str {
        match self {
            BasicCommand::List => "list",
            BasicCommand::Show => "show",
            BasicCommand::Create => "create",
            BasicCommand::Update => "update",
            BasicCommand::Delete => "delete",
            BasicCommand::Perform => "perform",
        }
    }

    /// Hooks a service must declare to serve this command.
    pub fn required(self) -> Capabilities {
        let read = Capabilities::AUTHORISE | Capabilities::UNBIND;
        let write = read | Capabilities::BIND | Capabilities::VALIDATE;
        match self {
            BasicCommand::List => read | Capabilities::FIND_MANY,
            BasicCommand::Show => read | Capabilities::FIND_ONE,
            BasicCommand::Create => write | Capabilities::INSTANTIATE | Capabilities::CREATE,
            BasicCommand::Update => write | Capabilities::FIND_ONE | Capabilities::UPDATE,
            BasicCommand::Delete => write | Capabilities::FIND_ONE | Capabilities::DELETE,
            BasicCommand::Perform => write | Capabilities::INSTANTIATE | Capabilities::PERFORM,
        }
    }

    fn is_read_only(self) -> bool {
        matches!(self, BasicCommand::List | BasicCommand::Show)
    }
}

impl fmt::Display for BasicCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub struct Controller<R: Role, E: Entity> {
    commands: BTreeMap<BasicCommand, ServiceWrapper<R, E>>,
    transactions: TransactionManager,
}

impl<R: Role, E: Entity> Controller<R, E> {
    pub fn new(transactions: TransactionManager) -> Self {
        Self {
            commands: BTreeMap::new(),
            transactions,
        }
    }

    /// Registers `service` for `command`.
    ///
    /// # Panics
    ///
    /// If the service does not declare every capability the command needs, or the
    /// command is already registered.
    pub fn add_basic_command<S: Service<R, E>>(&mut self, command: BasicCommand, service: S) {
        let wrapper = ServiceWrapper::new(Arc::new(service));
        let missing = command.required() - wrapper.capabilities();
        assert!(
            missing.is_empty(),
            "service for command `{command}` on ({}, {}) lacks {missing:?}",
            R::NAME,
            entity_type::<E>(),
        );
        let previous = self.commands.insert(command, wrapper);
        assert!(previous.is_none(), "command `{command}` registered twice");
        debug!(role = R::NAME, entity_type = entity_type::<E>(), %command, "Command registered");
    }

    pub fn commands(&self) -> impl Iterator<Item = BasicCommand> + '_ {
        self.commands.keys().copied()
    }

    /// Runs one command from transaction start to commit or rollback.
    ///
    /// `params` carries the request parameters, or the errors found while
    /// decoding them; decoding errors are reported as a validation failure.
    pub async fn handle_command(
        &self,
        command: BasicCommand,
        method: Method,
        principal: Principal,
        locale: impl Into<String>,
        params: Result<Model, Errors>,
    ) -> Outcome<E> {
        let Some(service) = self.commands.get(&command) else {
            warn!(role = R::NAME, entity_type = entity_type::<E>(), %command, "Unknown command");
            return Outcome::NotImplemented;
        };

        let tx = self.transactions.begin();
        debug!(role = R::NAME, entity_type = entity_type::<E>(), tx = tx.id(), %command, %method, "Command");
        let (params, decoding) = match params {
            Ok(params) => (params, Errors::new()),
            Err(errors) => (Model::new(), errors),
        };
        let request = Request::new(principal, method, locale, params, tx.session());

        let result = dispatch(service, command, &request, decoding).await;
        if let Err(e) = &result {
            let fault = !matches!(e, DispatchError::Denied);
            if fault && service.supports(Capabilities::ON_FAILURE) {
                let error = match e {
                    DispatchError::Service(e) => Some(e),
                    _ => None,
                };
                if let Err(hook) = service.on_failure(&request, None, error) {
                    warn!(%command, error = %hook, "on_failure failed");
                }
            }
        }
        resolve(tx, result, R::NAME, entity_type::<E>()).await
    }

    /// Routes `{base}{command}` for every registered command.
    pub fn routes<S>(self: Arc<Self>, base: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = Router::new();
        for command in self.commands() {
            let route = CommandRoute {
                controller: Arc::clone(&self),
                command,
            };
            router = router.route(
                &format!("{base}{}", command.path()),
                any(handle::<R, E>).with_state(route),
            );
        }
        router
    }
}

async fn dispatch<R: Role, E: Entity>(
    service: &ServiceWrapper<R, E>,
    command: BasicCommand,
    request: &Request,
    decoding: Errors,
) -> Result<Outcome<E>, DispatchError> {
    if !service.authorise(request).await? {
        return Err(DispatchError::Denied);
    }

    match *request.method() {
        Method::GET => show(service, command, request).await,
        Method::POST if !command.is_read_only() => write(service, command, request, decoding).await,
        _ => Ok(Outcome::NotImplemented),
    }
}

async fn show<R: Role, E: Entity>(
    service: &ServiceWrapper<R, E>,
    command: BasicCommand,
    request: &Request,
) -> Result<Outcome<E>, DispatchError> {
    if command == BasicCommand::List {
        let mut models = Vec::new();
        for entity in service.find_many(request).await? {
            let mut model = Model::new();
            service.unbind(request, &entity, &mut model)?;
            models.push(model);
        }
        return Ok(Outcome::Models(models));
    }

    let entity = load(service, command, request).await?;
    let mut model = Model::new();
    service.unbind(request, &entity, &mut model)?;
    Ok(Outcome::Model(model))
}

async fn write<R: Role, E: Entity>(
    service: &ServiceWrapper<R, E>,
    command: BasicCommand,
    request: &Request,
    mut errors: Errors,
) -> Result<Outcome<E>, DispatchError> {
    let mut entity = load(service, command, request).await?;
    if errors.is_empty() {
        service.bind(request, &mut entity, &mut errors)?;
        entity.check_constraints(&mut errors);
        service.validate(request, &entity, &mut errors).await?;
    }

    if errors.is_empty() {
        match command {
            BasicCommand::Create => service.create(request, &mut entity).await?,
            BasicCommand::Update => service.update(request, &mut entity).await?,
            BasicCommand::Delete => service.delete(request, &entity).await?,
            BasicCommand::Perform => service.perform(request, &mut entity, &mut errors).await?,
            BasicCommand::List | BasicCommand::Show => return Ok(Outcome::NotImplemented),
        }
    }

    let mut model = Model::new();
    service.unbind(request, &entity, &mut model)?;
    let response = Response::new(Some(entity), model, errors);

    if response.is_success() {
        if service.supports(Capabilities::ON_SUCCESS) {
            service.on_success(request, &response)?;
        }
    } else if service.supports(Capabilities::ON_FAILURE) {
        service.on_failure(request, Some(&response), None)?;
    }

    let (_, model, errors) = response.into_parts();
    if !errors.is_empty() {
        return Ok(Outcome::ValidationFailed(errors));
    }
    match command {
        BasicCommand::Create => Ok(Outcome::Created),
        _ => Ok(Outcome::Model(model)),
    }
}

/// A fresh entity for `create`/`perform`, the stored one otherwise.
async fn load<R: Role, E: Entity>(
    service: &ServiceWrapper<R, E>,
    command: BasicCommand,
    request: &Request,
) -> Result<E, ServiceError> {
    match command {
        BasicCommand::Create | BasicCommand::Perform => service.instantiate(request),
        _ => service.find_one(request).await,
    }
}

struct CommandRoute<R: Role, E: Entity> {
    controller: Arc<Controller<R, E>>,
    command: BasicCommand,
}

impl<R: Role, E: Entity> Clone for CommandRoute<R, E> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            command: self.command,
        }
    }
}

async fn handle<R: Role, E: Entity>(
    State(route): State<CommandRoute<R, E>>,
    method: Method,
    principal: Principal,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> axum::response::Response {
    let mut params = Model::from_pairs(query);
    let params = match Model::from_json(&body) {
        Ok(payload) => {
            params.merge(payload);
            Ok(params)
        }
        Err(errors) => Err(errors),
    };
    route
        .controller
        .handle_command(route.command, method, principal, locale(&headers), params)
        .await
        .into_response()
}
