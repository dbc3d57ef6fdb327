//! Error type shared by the relational repository ports.

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Failures raised by repository adapters.
    pub enum PersistenceError {
        /// The store is closed or unreachable.
        Connection { message: String } => "database connection failed: {message}",
        /// A statement failed while executing.
        Query { message: String } => "database query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Duplicate { message: String } => "duplicate record: {message}",
    }
}

impl From<PersistenceError> for Error {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Connection { message } => {
                Self::database_unavailable(format!("database unavailable: {message}"))
            }
            PersistenceError::Query { message } => {
                Self::internal(format!("database error: {message}"))
            }
            PersistenceError::Duplicate { message } => Self::invalid_request(message),
        }
    }
}
