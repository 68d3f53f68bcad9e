use std::path::PathBuf;

/// Everything that can stop a dashboard pass.
///
/// `NoSellers` and `EmptySeller` are warnings: the page still renders its
/// controls, only the seller section is replaced by the message. Every other
/// variant is shown as an error banner.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Failed to read sales data from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Unsupported sales data format: {0}")]
    UnsupportedFormat(String),

    #[error("Worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("The worksheet has no header row")]
    EmptySheet,

    #[error("Required columns are missing from the data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No branches found in the data")]
    NoBranches,

    #[error("Branch '{0}' does not exist")]
    UnknownBranch(String),

    #[error("No sellers found in branch '{0}'")]
    NoSellers(String),

    #[error("No data available for seller '{0}'")]
    EmptySeller(String),

    #[error("Failed to draw chart: {0}")]
    Chart(String),

    #[error("Failed to export table: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to render page: {0}")]
    Template(String),
}

impl DashboardError {
    /// Warnings halt the current pass but are not failures of the data itself.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NoSellers(_) | Self::EmptySeller(_))
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_name() {
        let err = DashboardError::MissingColumns(vec!["Tgt".into(), "commesion".into()]);
        assert_eq!(
            err.to_string(),
            "Required columns are missing from the data: Tgt, commesion"
        );
    }

    #[test]
    fn only_seller_gaps_are_warnings() {
        assert!(DashboardError::NoSellers("North".into()).is_warning());
        assert!(DashboardError::EmptySeller("Ali".into()).is_warning());
        assert!(!DashboardError::MissingColumns(vec![]).is_warning());
        assert!(!DashboardError::NoBranches.is_warning());
    }
}
