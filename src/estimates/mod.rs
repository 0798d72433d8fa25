pub mod amount;
pub mod commands;
pub mod reconciler;
pub mod seed;
pub mod selection;
pub mod store;

pub use reconciler::{EstimateListView, TabCounts};
pub use selection::{FilterSelection, Tab};
pub use store::EstimateStore;
