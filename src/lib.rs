//! # Acme Board
//!
//! A small shout board served over HTTP, built on [`crud_framework`].
//!
//! ## Features
//!
//! | Base path                    | Controller          | Caller          |
//! |------------------------------|---------------------|-----------------|
//! | `/api/anonymous/shout/`      | REST `list/create`  | anyone          |
//! | `/api/authenticated/shout/`  | REST `list/create`  | signed-in users |
//! | `/authenticated/consumer/`   | commands `create/update` | signed-in users |
//!
//! Authenticated shouts are checked against a configurable list of spam words.
//! Registering as a consumer grants the `Consumer` role, which in turn unlocks
//! `update` and closes `create` for that user.
//!
//! ## Module Tour
//!
//! - [`config`]: YAML settings with defaults for every section.
//! - [`auth`]: bearer tokens to [`Principal`](crud_framework::Principal)s, plus roles granted at runtime.
//! - [`model`]: the [`Shout`](model::Shout) and [`Consumer`](model::Consumer) entities.
//! - [`features`]: the services behind each base path.
//! - [`lifecycle`]: [`BoardSystem`](lifecycle::BoardSystem) start-up and shutdown, and logging.

pub mod auth;
pub mod config;
pub mod features;
pub mod lifecycle;
pub mod model;
