use thiserror::Error;

pub type TxResult<T> = Result<T, TxError>;

#[derive(Error, Debug)]
pub enum TxError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Out-of-range coordinate for {what}: {value}")]
    CoordinateRange { what: &'static str, value: f64 },
}
