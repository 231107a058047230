//! Listing query options.

use domain::OrderState;
use serde::{Deserialize, Serialize};

/// Sort key for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Highest order total first.
    PriceHigh,
    /// Lowest order total first.
    PriceLow,
}

/// Options for `list_for_user` / `list_for_vendor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub sort_by: SortBy,
    /// Optional exact-match filter on the order state.
    pub state: Option<OrderState>,
}

impl ListOptions {
    /// Creates options with default sorting and no filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort key.
    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Restricts results to a single state.
    pub fn in_state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }
}
