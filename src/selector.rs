use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

/// Picks the branch to show: the requested one, or the first branch in the sheet.
pub fn resolve_branch(dataset: &Dataset, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(branch) if dataset.has_branch(branch) => Ok(branch.to_string()),
        Some(branch) => Err(DashboardError::UnknownBranch(branch.to_string())),
        None => dataset
            .branches()
            .into_iter()
            .next()
            .ok_or(DashboardError::NoBranches),
    }
}

/// Distinct sellers of `branch`. An empty list halts the pass with a warning.
pub fn sellers_for(dataset: &Dataset, branch: &str) -> Result<Vec<String>> {
    if !dataset.has_branch(branch) {
        return Err(DashboardError::UnknownBranch(branch.to_string()));
    }
    let sellers = dataset.sellers_in(branch);
    if sellers.is_empty() {
        return Err(DashboardError::NoSellers(branch.to_string()));
    }
    Ok(sellers)
}

/// Number of sellers shown for `branch` (or the default branch); 0 when the
/// branch is unknown or has no sellers.
pub fn seller_count(dataset: &Dataset, branch: Option<&str>) -> usize {
    resolve_branch(dataset, branch)
        .map(|b| dataset.sellers_in(&b).len())
        .unwrap_or(0)
}

/// Position in a branch's seller list.
///
/// The raw index is never trusted: it is reduced modulo the seller count on
/// every read, so a list that shrank after a reload still yields a valid seller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerCursor {
    index: usize,
}

impl SellerCursor {
    pub fn new(index: usize) -> Self {
        SellerCursor { index }
    }

    /// Index into a seller list of length `count`; 0 for an empty list.
    pub fn position(&self, count: usize) -> usize {
        if count == 0 { 0 } else { self.index % count }
    }

    /// Moves to the next seller, wrapping after the last one.
    pub fn advance(&mut self, count: usize) {
        if count > 0 {
            self.index = (self.position(count) + 1) % count;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn pick<'a>(&self, sellers: &'a [String]) -> Option<&'a str> {
        sellers.get(self.position(sellers.len())).map(String::as_str)
    }
}
