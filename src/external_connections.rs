use sqlx::SqliteConnection;

/// A handle which can lend out a live database connection for the duration of a query
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut SqliteConnection;
}

/// Provides access to the external systems the application talks to. Driven adapters
/// receive an implementation of this trait so business logic never owns a connection directly.
pub trait ExternalConnectivity: Send {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Something that can open a transaction, yielding connectivity scoped to that transaction
pub trait Transactable {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// External connectivity with an open transaction which must be committed to persist changes.
/// Dropping the handle without committing rolls the transaction back.
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// Connectivity that can both run queries directly and open transactions
pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}

impl<T: ExternalConnectivity + Transactable> TransactableExternalConnectivity for T {}
