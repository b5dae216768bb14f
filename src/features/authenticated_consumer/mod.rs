//! Consumer registration: an authenticated user registers once (`create`) and may
//! then edit their own record (`update`).

mod create;
mod update;

pub use create::ConsumerCreateService;
pub use update::ConsumerUpdateService;

use crate::auth::RoleGrants;
use crate::model::Consumer;
use crud_framework::{Authenticated, BasicCommand, Controller, Repository, TransactionManager};

pub const BASE_PATH: &str = "/authenticated/consumer/";

/// Attributes a caller may set on their consumer record.
pub(crate) const FIELDS: &[&str] = &["company", "sector"];

pub fn controller(
    consumers: Repository<Consumer>,
    grants: RoleGrants,
    transactions: TransactionManager,
) -> Controller<Authenticated, Consumer> {
    let mut controller = Controller::new(transactions);
    controller.add_basic_command(
        BasicCommand::Create,
        ConsumerCreateService::new(consumers.clone(), grants),
    );
    controller.add_basic_command(BasicCommand::Update, ConsumerUpdateService::new(consumers));
    controller
}
