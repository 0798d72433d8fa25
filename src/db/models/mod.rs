pub mod customer;
pub mod estimate;
pub mod item;

pub use customer::{Customer, CustomerInput};
pub use estimate::{
    CustomerSnapshot, Estimate, EstimateInput, EstimateType, EstimateUpdate, LineItem,
    LineItemInput, DRAFT_STATUS,
};
pub use item::{Item, ItemInput};
