use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity schema {0} declares no fields")]
    EmptySchema(String),

    #[error("unknown field {field} in entity {entity}")]
    UnknownField { entity: String, field: String },

    #[error("key column {column} is not a field of entity {entity}")]
    InvalidKeyColumn { entity: String, column: String },

    #[error("invalid entity name: {0:?}")]
    InvalidEntityName(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
