pub mod catalog;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod invoice;
pub mod locations;
pub mod parties;

use rust_decimal::Decimal;
use validator::ValidationError;

// Helpers de validação compartilhados pelos payloads.
// O `validator` não conhece `Decimal`, então os checks numéricos são custom.
pub(crate) fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("deve ser maior que zero"))
    }
}

pub(crate) fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("não pode ser negativo"))
    }
}
