//! Data transfer objects for the application layer.

mod convert_dto;

pub use convert_dto::{ConvertOutcome, ConvertRequest};
