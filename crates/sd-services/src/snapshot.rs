//! Serializable copy of everything the strategy service owns

use sd_models::{ActionPlan, Kpi, Okr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySnapshot {
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub okrs: Vec<Okr>,
    #[serde(default)]
    pub action_plans: Vec<ActionPlan>,
}
