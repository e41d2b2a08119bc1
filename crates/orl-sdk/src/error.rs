use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("ledger error: {0}")]
    Ledger(#[from] orl_ledger::LedgerError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
