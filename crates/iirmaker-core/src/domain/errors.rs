use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IirResult<T> = Result<T, IirError>;
pub type ParserResult<T> = IirResult<T>;

/// Failure classes a table export can end in; each owns one process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IirErrorCategory {
    /// Short record, narrow row or non-numeric token.
    InputValidationError,
    /// Unreadable input, uncreatable or unwritable output.
    IoSystemError,
}

impl IirErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
        }
    }
}

/// Error raised anywhere in a table export.
///
/// `placeholder` is a stable dotted identifier (`INPUT.RECORD_TOKEN`,
/// `IO.OUTPUT_WRITE`, ...) that tests and scripts can match on; the message
/// is free-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IirError {
    category: IirErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl IirError {
    fn new(category: IirErrorCategory, placeholder: &'static str, message: String) -> Self {
        Self {
            category,
            placeholder,
            message,
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            IirErrorCategory::InputValidationError,
            placeholder,
            message.into(),
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(IirErrorCategory::IoSystemError, placeholder, message.into())
    }

    pub const fn category(&self) -> IirErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// `ERROR: [<placeholder>] <message>`, the first stderr line of a failed run.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    /// Closing stderr line of a failed run.
    pub fn exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for IirError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.name(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for IirError {}
