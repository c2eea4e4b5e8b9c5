//! Validations shared by OKR create and update

use sd_core::error::ValidationErrors;
use sd_models::{Okr, OkrScope};

use crate::base::{validate_not_blank, validate_weight, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct OkrBaseContract;

impl OkrBaseContract {
    pub fn validate_period(&self, okr: &Okr, errors: &mut ValidationErrors) {
        if okr.start_year > okr.end_year {
            errors.add("endYear", "must be greater than or equal to start year");
        }
        if okr.scope == OkrScope::Annual && okr.start_year != okr.end_year {
            errors.add("scope", "annual objectives must start and end in the same year");
        }
    }
}

impl Contract<Okr> for OkrBaseContract {
    fn validate(&self, okr: &Okr) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("title", &okr.title, &mut errors);
        self.validate_period(okr, &mut errors);
        validate_weight(okr.weight, &mut errors);
        errors.into_result()
    }
}
