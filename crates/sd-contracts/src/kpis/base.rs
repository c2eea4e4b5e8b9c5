//! Validations shared by KPI create and update

use sd_core::error::ValidationErrors;
use sd_models::Kpi;

use crate::base::{validate_not_blank, validate_weight, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct KpiBaseContract;

impl KpiBaseContract {
    pub fn validate_goal(&self, goal: f64, errors: &mut ValidationErrors) {
        if !goal.is_finite() {
            errors.add("goal", "must be a number");
        } else if goal < 0.0 {
            errors.add("goal", "must be greater than or equal to 0");
        }
    }
}

impl Contract<Kpi> for KpiBaseContract {
    fn validate(&self, kpi: &Kpi) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("name", &kpi.name, &mut errors);
        self.validate_goal(kpi.goal, &mut errors);
        validate_weight(kpi.weight, &mut errors);
        errors.into_result()
    }
}
