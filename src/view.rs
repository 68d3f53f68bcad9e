//! The render model: one pass from dataset and selection to what is shown.

use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::format::{SellerTable, format_seller};
use crate::selector::{SellerCursor, resolve_branch, sellers_for};
use log::warn;
use serde::Serialize;

/// Outcome of a render pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewState {
    Ready {
        seller: String,
        /// 1-based position of the seller within the branch
        position: usize,
        seller_count: usize,
        table: SellerTable,
    },
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Everything the page needs for one render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub branches: Vec<String>,
    pub branch: Option<String>,
    pub state: ViewState,
    pub loaded_at: Option<String>,
}

impl DashboardView {
    /// Runs the filter and format steps for the given selection.
    ///
    /// Stops at the first failure: an unknown or empty branch, a seller
    /// without rows, or missing columns. The returned view then carries only
    /// the message, never a partial table.
    pub fn build(dataset: &Dataset, branch: Option<&str>, cursor: SellerCursor) -> Self {
        let branches = dataset.branches();
        let loaded_at = Some(dataset.loaded_at().format("%Y-%m-%d %H:%M:%S").to_string());

        let branch = match resolve_branch(dataset, branch) {
            Ok(branch) => branch,
            Err(e) => {
                return DashboardView {
                    branches,
                    branch: None,
                    state: ViewState::from_error(&e),
                    loaded_at,
                };
            }
        };

        let state = match Self::seller_state(dataset, &branch, cursor) {
            Ok(state) => state,
            Err(e) => {
                warn!("Render halted for branch {}: {}", branch, e);
                ViewState::from_error(&e)
            }
        };

        DashboardView {
            branches,
            branch: Some(branch),
            state,
            loaded_at,
        }
    }

    /// A view for a dataset that could not be loaded at all.
    pub fn failed(err: &DashboardError) -> Self {
        DashboardView {
            branches: Vec::new(),
            branch: None,
            state: ViewState::from_error(err),
            loaded_at: None,
        }
    }

    pub fn table(&self) -> Option<&SellerTable> {
        match &self.state {
            ViewState::Ready { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.table().is_some()
    }

    fn seller_state(
        dataset: &Dataset,
        branch: &str,
        cursor: SellerCursor,
    ) -> Result<ViewState, DashboardError> {
        let sellers = sellers_for(dataset, branch)?;
        let position = cursor.position(sellers.len());
        let seller = &sellers[position];
        let table = format_seller(&dataset.seller_rows(branch, seller))?;

        Ok(ViewState::Ready {
            seller: seller.clone(),
            position: position + 1,
            seller_count: sellers.len(),
            table,
        })
    }
}

impl ViewState {
    pub fn from_error(err: &DashboardError) -> Self {
        if err.is_warning() {
            ViewState::Warning {
                message: err.to_string(),
            }
        } else {
            ViewState::Error {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{full_header, row, sample};
    use crate::record::COL_COMMISSION;

    #[test]
    fn default_selection_shows_first_seller_of_first_branch() {
        let view = DashboardView::build(&sample(), None, SellerCursor::default());
        assert_eq!(view.branch.as_deref(), Some("North"));
        match view.state {
            ViewState::Ready {
                seller,
                position,
                seller_count,
                ..
            } => {
                assert_eq!(seller, "Ali");
                assert_eq!(position, 1);
                assert_eq!(seller_count, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn cursor_picks_seller_modulo_count() {
        let view = DashboardView::build(&sample(), Some("North"), SellerCursor::new(3));
        assert_eq!(view.table().unwrap().seller, "Sara");
    }

    #[test]
    fn empty_branch_is_a_warning_without_table() {
        let view = DashboardView::build(&sample(), Some("East"), SellerCursor::default());
        assert!(matches!(view.state, ViewState::Warning { .. }));
        assert!(view.table().is_none());
        assert_eq!(view.branches.len(), 3);
    }

    #[test]
    fn missing_column_is_an_error_without_table() {
        let mut header = full_header();
        header.retain(|c| c != COL_COMMISSION);
        let data = Dataset::new(header, vec![row("North", "Ali", "Phones", 1.0, 2.0)]).unwrap();

        let view = DashboardView::build(&data, None, SellerCursor::default());
        assert!(matches!(view.state, ViewState::Error { ref message } if message.contains("commesion")));
        assert!(!view.is_ready());
    }

    #[test]
    fn empty_dataset_has_no_branches() {
        let data = Dataset::new(full_header(), vec![]).unwrap();
        let view = DashboardView::build(&data, None, SellerCursor::default());
        assert!(matches!(view.state, ViewState::Error { .. }));
        assert!(view.branch.is_none());
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let view = DashboardView::build(&sample(), Some("East"), SellerCursor::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"]["status"], "warning");
        assert_eq!(json["branch"], "East");
    }
}
