pub mod validator;

pub use validator::{is_valid_email, validate_draft, ValidRecord, ValidationError};
