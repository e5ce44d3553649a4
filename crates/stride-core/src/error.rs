//! Error types for Stride

use serde::Serialize;
use thiserror::Error;

/// Category of a projection input problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed or out-of-range field (negative income/amount, empty category)
    InvalidInput,
    /// Frequency outside the supported billing cycles
    UnsupportedFrequency,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::UnsupportedFrequency => "UnsupportedFrequency",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single offending field in a projection request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: ErrorKind,
    /// Request field name (`monthly_income`, `category`, `amount`, `frequency`)
    pub field: &'static str,
    /// Index of the expense entry, `None` for request-level fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "expense #{} ({} / {}): {}",
                index,
                self.category.as_deref().unwrap_or(""),
                self.subcategory.as_deref().unwrap_or(""),
                self.message
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Every problem found while validating a projection request.
///
/// Always holds at least one issue. The overall kind is that of the first
/// issue in input order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}: {}", self.kind(), self.summary())]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    /// Returns `None` when there is nothing to report
    pub fn from_issues(issues: Vec<Issue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self { issues })
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.issues
            .first()
            .map(|i| i.kind)
            .unwrap_or(ErrorKind::InvalidInput)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: ErrorKind, field: &'static str, index: Option<usize>) -> Issue {
        Issue {
            kind,
            field,
            index,
            category: index.map(|_| "Home".to_string()),
            subcategory: index.map(|_| "Gas".to_string()),
            message: format!("bad {}", field),
        }
    }

    #[test]
    fn test_empty_issues_is_not_an_error() {
        assert!(ValidationError::from_issues(vec![]).is_none());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::from_issues(vec![
            issue(ErrorKind::InvalidInput, "monthly_income", None),
            issue(ErrorKind::UnsupportedFrequency, "frequency", Some(2)),
        ])
        .unwrap();

        assert_eq!(
            err.to_string(),
            "InvalidInput: bad monthly_income; expense #2 (Home / Gas): bad frequency"
        );
        let wrapped: Error = err.into();
        assert!(wrapped.to_string().starts_with("InvalidInput: "));
    }
}
