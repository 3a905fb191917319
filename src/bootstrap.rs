use crate::domain::task::driven_ports::TaskWriter;
use crate::domain::task::driving_ports::TaskPort;
use crate::domain::user::NewUser;
use crate::domain::user::driven_ports::{DetectUser, UserReader, UserWriter};
use crate::domain::user::driving_ports::UserPort;
use crate::external_connections::{TransactableExternalConnectivity, TransactionHandle};
use crate::persistence::db_task_driven_ports::DbTaskWriter;
use crate::persistence::db_user_driven_ports::{DbDetectUser, DbReadUsers, DbWriteUsers};
use crate::{domain, persistence};
use anyhow::Context;
use tracing::info;

pub const DEMO_EMAIL: &str = "demo@demo.io";
pub const DEMO_PASSWORD: &str = "demo123";
const DEMO_NAME: &str = "Demo User";
const DEMO_TASK_COUNT: usize = domain::task::DEFAULT_SEED_COUNT;

/// Creates the demo account and fills it with generated tasks, unless it already exists
pub async fn ensure_demo_account(
    ext_cxn: &persistence::ExternalConnectivity,
) -> Result<(), anyhow::Error> {
    seed_demo_account(
        &mut ext_cxn.clone(),
        &DbReadUsers {},
        &DbWriteUsers {},
        &DbDetectUser {},
        &DbTaskWriter {},
    )
    .await
}

async fn seed_demo_account(
    ext_cxn: &mut impl TransactableExternalConnectivity,
    u_reader: &impl UserReader,
    u_writer: &impl UserWriter,
    u_detect: &impl DetectUser,
    task_write: &impl TaskWriter,
) -> Result<(), anyhow::Error> {
    let existing = u_reader
        .user_by_email(DEMO_EMAIL, &mut *ext_cxn)
        .await
        .context("Looking up the demo account")?;
    if existing.is_some() {
        info!("Demo account already exists");
        return Ok(());
    }

    let demo_user = NewUser {
        email: DEMO_EMAIL.to_owned(),
        name: DEMO_NAME.to_owned(),
        password: DEMO_PASSWORD.to_owned(),
    };
    let mut transaction = ext_cxn.start_transaction().await?;
    let user = domain::user::UserService {}
        .register(&demo_user, &mut transaction, u_writer, u_detect)
        .await
        .context("Creating the demo account")?;
    domain::task::TaskService {}
        .reseed_tasks(&user.id, DEMO_TASK_COUNT, &mut transaction, task_write)
        .await
        .context("Generating demo tasks")?;
    transaction.commit().await?;

    info!("Created demo account {DEMO_EMAIL} with {DEMO_TASK_COUNT} tasks");
    Ok(())
}
