use crate::primitives::Money;

// ============================================================================
// Customer Domain Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum CustomerCommand {
    UseCredit { amount: Money },
    ReleaseCredit { amount: Money },
    UpdateCreditLimit { limit: Money },
    ActivateCustomer,
    DeactivateCustomer,
}

impl CustomerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CustomerCommand::UseCredit { .. } => "UseCredit",
            CustomerCommand::ReleaseCredit { .. } => "ReleaseCredit",
            CustomerCommand::UpdateCreditLimit { .. } => "UpdateCreditLimit",
            CustomerCommand::ActivateCustomer => "ActivateCustomer",
            CustomerCommand::DeactivateCustomer => "DeactivateCustomer",
        }
    }
}
