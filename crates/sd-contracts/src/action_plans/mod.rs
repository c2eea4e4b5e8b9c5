//! Action plan contracts

mod base;
mod create;
mod status;
mod task;

pub use base::ActionPlanBaseContract;
pub use create::CreateActionPlanContract;
pub use status::{PlanStatusChange, PlanStatusContract};
pub use task::TaskContract;
