pub mod error;
pub mod value;

pub use error::{ConfigError, EngineError, EngineResult, MappingError, QueryError, SessionError};
pub use value::{QueryParameters, Value};
