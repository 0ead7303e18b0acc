use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::CoreConfig;
use crate::domain::customer::CustomerRepository;
use crate::domain::service_error::ServiceError;
use crate::ports::{
    AuditLog, OrderFilter, OrderNumberSequence, Page, PageRequest, Repository, StatusChangeRecord,
};
use crate::primitives::{Clock, EntityId, IdGenerator, Money};

use super::aggregate::{NewOrder, Order};
use super::calculation::{calculate_with, OrderCalculation};
use super::commands::{OrderCommand, PlaceOrder};
use super::errors::OrderError;
use super::events::StatusChange;
use super::item::OrderItem;
use super::validator::{OrderValidator, ValidationReport};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Load → Mutate → Store → Audit
//
// The audit log only sees status changes that were persisted. A failed
// audit write is logged and never reported as a failed command, since the
// order is already stored. Each call is atomic only as far as the repository
// is; concurrent commands on the same order are last-writer-wins.
//
// ============================================================================

pub type OrderRepository = dyn Repository<Order, Filter = OrderFilter>;

pub struct OrderCommandHandler {
    orders: Arc<OrderRepository>,
    customers: Arc<CustomerRepository>,
    sequence: Arc<dyn OrderNumberSequence>,
    audit: Arc<dyn AuditLog>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    config: CoreConfig,
}

impl OrderCommandHandler {
    pub fn new(
        orders: Arc<OrderRepository>,
        customers: Arc<CustomerRepository>,
        sequence: Arc<dyn OrderNumberSequence>,
        audit: Arc<dyn AuditLog>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        config: CoreConfig,
    ) -> Self {
        Self {
            orders,
            customers,
            sequence,
            audit,
            ids,
            clock,
            config,
        }
    }

    /// Create a DRAFT order with its lines and shipping charge, and store it
    pub async fn place_order(&self, command: PlaceOrder) -> Result<Order, ServiceError> {
        if command.items.is_empty() {
            return Err(OrderError::EmptyItems.into());
        }

        let customer = self.customers.get_by_id(command.customer_id).await?;
        if !customer.is_active {
            tracing::warn!(customer_id = %customer.id, "Order rejected for inactive customer");
            return Err(ServiceError::InactiveCustomer(customer.id));
        }

        let clock = self.clock.as_ref();
        let ids = self.ids.as_ref();
        let order_number = self.sequence.next_order_number(clock.now()).await?;

        let mut order = Order::create(
            NewOrder {
                order_number,
                customer_id: command.customer_id,
                shipping_address_id: command.shipping_address_id,
                billing_address_id: command.billing_address_id,
                created_by: command.created_by,
                priority: command.priority,
                order_type: command.order_type,
                shipping_method: command.shipping_method,
                currency: command.currency,
                required_date: command.required_date,
            },
            ids,
            clock,
        )?;

        for new_item in command.items {
            let item = OrderItem::create(order.id, new_item, ids, clock)?;
            order.add_item(item, clock)?;
        }
        let shipping = command
            .shipping_amount
            .unwrap_or(self.config.calculation.default_shipping_cost);
        order.set_charges(shipping, Money::ZERO, clock)?;
        order.calculate_totals(clock)?;

        let order = self.orders.create(order).await?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            customer_id = %order.customer_id,
            items = order.items.len(),
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    /// Handle a command and persist the updated order
    pub async fn handle(
        &self,
        order_id: EntityId,
        command: OrderCommand,
        actor_id: EntityId,
    ) -> Result<Order, ServiceError> {
        let mut order = self.orders.get_by_id(order_id).await?;
        let command_name = command.name();

        let status_changes = match self.apply(&mut order, command, actor_id) {
            Ok(changes) => changes,
            Err(error) => {
                tracing::warn!(
                    order_id = %order_id,
                    command = command_name,
                    kind = %error.kind(),
                    error = %error,
                    "Order command rejected"
                );
                return Err(error.into());
            }
        };

        let order = self.orders.update(order).await?;

        for change in &status_changes {
            if let Err(error) = self
                .audit
                .record(StatusChangeRecord::from_change(change, actor_id))
                .await
            {
                tracing::error!(
                    order_id = %order_id,
                    from = %change.from,
                    to = %change.to,
                    error = %error,
                    "Failed to record status change in audit log"
                );
            }
            tracing::info!(
                order_id = %order_id,
                from = %change.from,
                to = %change.to,
                reason = change.reason.as_deref().unwrap_or(""),
                "Order status changed"
            );
        }
        tracing::debug!(
            order_id = %order_id,
            command = command_name,
            status = %order.status,
            payment_status = %order.payment_status,
            total = %order.total_amount,
            paid = %order.paid_amount,
            "Order command applied"
        );
        Ok(order)
    }

    fn apply(
        &self,
        order: &mut Order,
        command: OrderCommand,
        actor_id: EntityId,
    ) -> Result<Vec<StatusChange>, OrderError> {
        let clock = self.clock.as_ref();
        let mut changes = Vec::new();

        match command {
            OrderCommand::AddItem { item } => {
                let item = OrderItem::create(order.id, item, self.ids.as_ref(), clock)?;
                order.add_item(item, clock)?;
            }
            OrderCommand::RemoveItem { item_id } => {
                order.remove_item(item_id, clock)?;
            }
            OrderCommand::ChangeStatus { status, reason } => {
                changes.push(order.change_status(status, reason, clock)?);
            }
            OrderCommand::RecordPayment { amount } => order.add_payment(amount, clock)?,
            OrderCommand::RecordRefund { amount } => {
                let outcome = order.add_refund(amount, clock)?;
                changes.extend(outcome.status_change);
            }
            OrderCommand::ShipItem { item_id, quantity } => order.ship_item(item_id, quantity, clock)?,
            OrderCommand::ReturnItem { item_id, quantity } => order.return_item(item_id, quantity, clock)?,
            OrderCommand::SetCharges { shipping, discount } => order.set_charges(shipping, discount, clock)?,
            OrderCommand::SetTracking { tracking_number, carrier } => {
                order.set_tracking(tracking_number, carrier, actor_id, clock)?
            }
            OrderCommand::Approve => order.approve(actor_id, clock)?,
        }
        Ok(changes)
    }

    /// Price the stored order with the calculation engine, without saving
    pub async fn quote(&self, order_id: EntityId) -> Result<OrderCalculation, ServiceError> {
        let order = self.orders.get_by_id(order_id).await?;
        Ok(calculate_with(&order, &self.config.calculation))
    }

    /// Price with an explicit tax rate and shipping cost
    pub async fn quote_with(
        &self,
        order_id: EntityId,
        default_tax_rate: Decimal,
        shipping_cost: Money,
    ) -> Result<OrderCalculation, ServiceError> {
        let order = self.orders.get_by_id(order_id).await?;
        Ok(super::calculation::calculate_order_totals(&order, default_tax_rate, shipping_cost))
    }

    pub async fn validate(&self, order_id: EntityId) -> Result<ValidationReport, ServiceError> {
        let order = self.orders.get_by_id(order_id).await?;
        let validator = OrderValidator::new(self.config.validation.clone());
        Ok(validator.validate(&order, self.clock.as_ref()))
    }

    pub async fn orders_for_customer(
        &self,
        customer_id: EntityId,
        page: PageRequest,
    ) -> Result<Page<Order>, ServiceError> {
        let filter = OrderFilter {
            customer_id: Some(customer_id),
            ..Default::default()
        };
        Ok(self.orders.list(&filter, page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Customer, CustomerSource, CustomerType, NewCustomer};
    use crate::domain::error_kind::ErrorKind;
    use crate::domain::order::item::NewOrderItem;
    use crate::domain::order::value_objects::{OrderPriority, OrderStatus, OrderType, PaymentStatus, ShippingMethod};
    use crate::ports::{AuditError, CustomerFilter, InMemoryAuditLog, InMemoryOrderSequence, InMemoryRepository};
    use crate::primitives::{FixedClock, RandomIds};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    struct Fixture {
        handler: OrderCommandHandler,
        audit: Arc<InMemoryAuditLog>,
        customers: Arc<InMemoryRepository<Customer, CustomerFilter>>,
        clock: Arc<FixedClock>,
    }

    /// Audit sink that always fails
    struct UnavailableAuditLog;

    #[async_trait::async_trait]
    impl AuditLog for UnavailableAuditLog {
        async fn record(&self, _record: StatusChangeRecord) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("connection refused".to_string()))
        }
    }

    fn create_test_fixture() -> Fixture {
        let audit = Arc::new(InMemoryAuditLog::new());
        create_test_fixture_with_sink(audit.clone(), audit)
    }

    fn create_test_fixture_with_sink(sink: Arc<dyn AuditLog>, audit: Arc<InMemoryAuditLog>) -> Fixture {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 11, 5, 15, 0, 0).unwrap()));
        let customers = Arc::new(InMemoryRepository::<Customer, CustomerFilter>::new("customer"));
        let mut config = CoreConfig::default();
        config.calculation.default_shipping_cost = Money::new(dec!(10));

        let handler = OrderCommandHandler::new(
            Arc::new(InMemoryRepository::<Order, OrderFilter>::new("order")),
            customers.clone(),
            Arc::new(InMemoryOrderSequence::new()),
            sink,
            Arc::new(RandomIds),
            clock.clone(),
            config,
        );
        Fixture { handler, audit, customers, clock }
    }

    async fn create_test_customer(fixture: &Fixture) -> Customer {
        let customer = Customer::create(
            NewCustomer {
                customer_code: "ACME-01".to_string(),
                customer_type: CustomerType::Business,
                first_name: "Wile".to_string(),
                last_name: "Coyote".to_string(),
                email: None,
                company_name: Some("Acme".to_string()),
                credit_limit: Money::new(dec!(5000)),
                source: CustomerSource::Phone,
            },
            &RandomIds,
            fixture.clock.as_ref(),
        )
        .unwrap();
        fixture.customers.create(customer).await.unwrap()
    }

    fn place_command(customer_id: EntityId) -> PlaceOrder {
        PlaceOrder {
            customer_id,
            shipping_address_id: EntityId::new(),
            billing_address_id: EntityId::new(),
            created_by: EntityId::new(),
            priority: OrderPriority::Normal,
            order_type: OrderType::Standard,
            shipping_method: ShippingMethod::Ground,
            currency: "USD".to_string(),
            required_date: None,
            items: vec![NewOrderItem {
                product_id: EntityId::new(),
                product_sku: "ROCKET-SKATES".to_string(),
                product_name: "Rocket Skates".to_string(),
                quantity: 2,
                unit_price: Money::new(dec!(25.00)),
                discount_amount: Money::new(dec!(5.00)),
                tax_rate: dec!(8),
                weight: 3.0,
            }],
            shipping_amount: None,
        }
    }

    #[tokio::test]
    async fn test_place_order() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;

        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();
        assert_eq!(order.order_number, "2024-000001");
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.subtotal, Money::new(dec!(43.20)));
        assert_eq!(order.total_amount, Money::new(dec!(53.20)));

        let report = fixture.handler.validate(order.id).await.unwrap();
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[tokio::test]
    async fn test_place_order_requires_items_and_active_customer() {
        let fixture = create_test_fixture();
        let mut customer = create_test_customer(&fixture).await;

        let mut empty = place_command(customer.id);
        empty.items.clear();
        let err = fixture.handler.place_order(empty).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Argument));

        customer.deactivate(fixture.clock.as_ref());
        fixture.customers.update(customer.clone()).await.unwrap();
        let err = fixture.handler.place_order(place_command(customer.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InactiveCustomer(id) if id == customer.id));

        let err = fixture.handler.place_order(place_command(EntityId::new())).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_changes_are_audited() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();
        let actor = EntityId::new();

        let order = fixture
            .handler
            .handle(
                order.id,
                OrderCommand::ChangeStatus { status: OrderStatus::Pending, reason: Some("submitted".to_string()) },
                actor,
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let records = fixture.audit.for_entity(order.id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actor_id, actor);
        assert_eq!(records[0].reason.as_deref(), Some("submitted"));
    }

    #[tokio::test]
    async fn test_rejected_transition_not_audited_or_stored() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();

        let err = fixture
            .handler
            .handle(order.id, OrderCommand::ChangeStatus { status: OrderStatus::Shipped, reason: None }, EntityId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidTransition));
        assert!(fixture.audit.records().await.is_empty());

        let report = fixture.handler.validate(order.id).await.unwrap();
        assert!(report.is_valid);
    }

    #[tokio::test]
    async fn test_full_refund_audits_skip_ahead() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();
        let actor = EntityId::new();

        let total = order.total_amount;
        fixture
            .handler
            .handle(order.id, OrderCommand::RecordPayment { amount: total }, actor)
            .await
            .unwrap();
        let refunded = fixture
            .handler
            .handle(order.id, OrderCommand::RecordRefund { amount: total }, actor)
            .await
            .unwrap();

        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
        let records = fixture.audit.for_entity(order.id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].new_status, "REFUNDED");
    }

    #[tokio::test]
    async fn test_quote_uses_engine() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();

        let calc = fixture.handler.quote(order.id).await.unwrap();
        assert_eq!(calc.subtotal, Money::new(dec!(50)));
        assert_eq!(calc.tax_amount, Money::new(dec!(3.60)));
        assert_eq!(calc.shipping_amount, Money::new(dec!(10)));

        let explicit = fixture.handler.quote_with(order.id, dec!(0), Money::ZERO).await.unwrap();
        assert_eq!(explicit.total_amount, Money::new(dec!(48.60)));
    }

    #[tokio::test]
    async fn test_items_and_tracking() {
        let fixture = create_test_fixture();
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();
        let actor = EntityId::new();
        let item_id = order.items[0].id;

        let order = fixture
            .handler
            .handle(order.id, OrderCommand::ShipItem { item_id, quantity: 2 }, actor)
            .await
            .unwrap();
        assert!(order.all_items_shipped());

        let order = fixture
            .handler
            .handle(
                order.id,
                OrderCommand::SetTracking { tracking_number: "TRK-1".to_string(), carrier: "ACME Post".to_string() },
                actor,
            )
            .await
            .unwrap();
        assert_eq!(order.shipped_by, Some(actor));

        let page = fixture.handler.orders_for_customer(customer.id, PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn test_audit_failure_keeps_stored_change() {
        let fixture = create_test_fixture_with_sink(Arc::new(UnavailableAuditLog), Arc::new(InMemoryAuditLog::new()));
        let customer = create_test_customer(&fixture).await;
        let order = fixture.handler.place_order(place_command(customer.id)).await.unwrap();
        let actor = EntityId::new();

        let updated = fixture
            .handler
            .handle(order.id, OrderCommand::ChangeStatus { status: OrderStatus::Pending, reason: None }, actor)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Pending);

        let next = fixture
            .handler
            .handle(order.id, OrderCommand::ChangeStatus { status: OrderStatus::Confirmed, reason: None }, actor)
            .await
            .unwrap();
        assert_eq!(next.previous_status, Some(OrderStatus::Pending));
        assert!(fixture.audit.records().await.is_empty());
    }
}
