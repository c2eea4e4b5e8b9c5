//! OKR contracts

mod base;
mod create;
mod link;
mod update;

pub use base::OkrBaseContract;
pub use create::CreateOkrContract;
pub use link::LinkKpiContract;
pub use update::UpdateOkrContract;
