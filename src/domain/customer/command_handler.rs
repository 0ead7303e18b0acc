use std::sync::Arc;

use crate::domain::service_error::ServiceError;
use crate::ports::{CustomerFilter, Repository};
use crate::primitives::{Clock, EntityId, IdGenerator};

use super::aggregate::{Customer, NewCustomer};
use super::commands::CustomerCommand;

// ============================================================================
// Customer Command Handler
// ============================================================================
//
// Orchestrates: Load → Mutate (credit ledger) → Store
//
// ============================================================================

pub type CustomerRepository = dyn Repository<Customer, Filter = CustomerFilter>;

pub struct CustomerCommandHandler {
    customers: Arc<CustomerRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl CustomerCommandHandler {
    pub fn new(customers: Arc<CustomerRepository>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { customers, ids, clock }
    }

    pub async fn register(&self, new: NewCustomer) -> Result<Customer, ServiceError> {
        let customer = Customer::create(new, self.ids.as_ref(), self.clock.as_ref())?;
        let customer = self.customers.create(customer).await?;
        tracing::info!(
            customer_id = %customer.id,
            customer_code = %customer.customer_code,
            credit_limit = %customer.credit_limit,
            "Customer registered"
        );
        Ok(customer)
    }

    /// Handle a command and persist the updated customer
    pub async fn handle(&self, customer_id: EntityId, command: CustomerCommand) -> Result<Customer, ServiceError> {
        let mut customer = self.customers.get_by_id(customer_id).await?;
        let clock = self.clock.as_ref();
        let command_name = command.name();

        let outcome = match command {
            CustomerCommand::UseCredit { amount } => customer.use_credit(amount, clock),
            CustomerCommand::ReleaseCredit { amount } => customer.release_credit(amount, clock),
            CustomerCommand::UpdateCreditLimit { limit } => customer.update_credit_limit(limit, clock),
            CustomerCommand::ActivateCustomer => {
                customer.activate(clock);
                Ok(())
            }
            CustomerCommand::DeactivateCustomer => {
                customer.deactivate(clock);
                Ok(())
            }
        };

        if let Err(error) = outcome {
            tracing::warn!(
                customer_id = %customer_id,
                command = command_name,
                kind = %error.kind(),
                error = %error,
                "Customer command rejected"
            );
            return Err(error.into());
        }

        let customer = self.customers.update(customer).await?;
        tracing::debug!(
            customer_id = %customer_id,
            command = command_name,
            credit_used = %customer.credit_used,
            available = %customer.available_credit(),
            "Customer command applied"
        );
        Ok(customer)
    }
}
