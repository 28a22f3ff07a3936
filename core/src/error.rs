use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("no scoring field specified")]
    NoScoringField,

    #[error("{what} has {values} entries but {fields} fields are configured")]
    FieldWeightMismatch { what: &'static str, fields: usize, values: usize },

    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("idf field '{field}' is not one of the scored fields")]
    IdfFieldNotScored { field: String },

    #[error("cannot average field '{field}' over an empty collection")]
    EmptyCollection { field: String },

    #[error("index inconsistent with collection for term '{term}' in field '{field}': {reason}")]
    IndexInconsistency { field: String, term: String, reason: String },

    #[error("unknown ranking model '{0}'")]
    UnknownModel(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
