//! KPI contracts

mod base;
mod create;
mod measurement;
mod update;

pub use base::KpiBaseContract;
pub use create::CreateKpiContract;
pub use measurement::MeasurementContract;
pub use update::UpdateKpiContract;
