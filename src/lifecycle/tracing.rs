//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber for the whole board.
//! `RUST_LOG` wins when set; otherwise the level comes from `log.level` in the
//! configuration.
//!
//! ```bash
//! # Transaction and store traffic
//! RUST_LOG=debug acme-board --config board.yaml
//!
//! # Only the framework
//! RUST_LOG=crud_framework=debug acme-board
//! ```
//!
//! Framework events carry `role`, `entity_type` and `tx` fields so one request can
//! be followed from the controller through the store:
//!
//! ```text
//! DEBUG Transaction begun tx=3
//! DEBUG Command role="Authenticated" entity_type="Consumer" tx=3 command=create method=POST
//!  INFO Consumer registered username="alice" company="Acme"
//!  INFO Inserted entity_type="Consumer" id=1 size=1
//! DEBUG Transaction committed tx=3 writes=1
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // entity_type and role identify the source
        .compact()
        .init();
}
