use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use erp_order_core::config::CoreConfig;
use erp_order_core::domain::catalog::{NewProduct, Product, ProductCategory, SafeProduct};
use erp_order_core::domain::customer::{
    Customer, CustomerCommand, CustomerCommandHandler, CustomerSource, CustomerType, NewCustomer,
};
use erp_order_core::domain::order::{
    calculate_shipping_weight, AddressType, NewAddress, NewOrderItem, Order, OrderAddress, OrderCommand,
    OrderCommandHandler, OrderPriority, OrderStatus, OrderType, PlaceOrder, ShippingMethod,
};
use erp_order_core::ports::{
    CustomerFilter, InMemoryAuditLog, InMemoryOrderSequence, InMemoryRepository, OrderFilter,
};
use erp_order_core::primitives::{Clock, EntityId, Money, SystemClock, TimeOrderedIds};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,erp_order_core=debug")),
        )
        .init();

    let config = CoreConfig::from_env()?;
    tracing::info!(
        default_tax_rate = %config.calculation.default_tax_rate,
        default_shipping_cost = %config.calculation.default_shipping_cost,
        large_order_threshold = %config.validation.large_order_threshold,
        "Starting order lifecycle demo"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids = Arc::new(TimeOrderedIds);

    // === 1. Wire in-memory collaborators ===
    let customers = Arc::new(InMemoryRepository::<Customer, CustomerFilter>::new("customer"));
    let orders = Arc::new(InMemoryRepository::<Order, OrderFilter>::new("order"));
    let audit = Arc::new(InMemoryAuditLog::new());

    let customer_handler = CustomerCommandHandler::new(customers.clone(), ids.clone(), clock.clone());
    let order_handler = OrderCommandHandler::new(
        orders,
        customers,
        Arc::new(InMemoryOrderSequence::new()),
        audit.clone(),
        ids.clone(),
        clock.clone(),
        config,
    );

    // === 2. Catalogue ===
    let category = ProductCategory::create_root("Office Lighting", ids.as_ref(), clock.as_ref())?;
    let mut lamp = Product::create(
        NewProduct {
            sku: "LAMP-DESK-01".to_string(),
            name: "Desk Lamp".to_string(),
            category_id: category.id,
            price: Money::new(dec!(45.00)),
            cost: Money::new(dec!(18.50)),
        },
        ids.as_ref(),
        clock.as_ref(),
    )?;
    lamp.set_tax_rate(Some(dec!(8)), clock.as_ref())?;
    lamp.adjust_stock(25, clock.as_ref())?;
    let safe = SafeProduct::from(&lamp);
    tracing::info!(
        sku = %safe.sku,
        price = %safe.price,
        margin_percent = ?lamp.margin_percent(),
        "Product ready"
    );

    // === 3. Customer and address ===
    let customer = customer_handler
        .register(NewCustomer {
            customer_code: "NORTHWIND".to_string(),
            customer_type: CustomerType::Business,
            first_name: "Nancy".to_string(),
            last_name: "Davolio".to_string(),
            email: Some("purchasing@northwind.example".to_string()),
            company_name: Some("Northwind Traders".to_string()),
            credit_limit: Money::new(dec!(2500)),
            source: CustomerSource::Referral,
        })
        .await?;

    let address = OrderAddress::create(
        NewAddress {
            customer_id: Some(customer.id),
            order_id: None,
            address_type: AddressType::Both,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            address_line1: "507 20th Ave E".to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            postal_code: "98122".to_string(),
            country: "USA".to_string(),
        },
        ids.as_ref(),
        clock.as_ref(),
    )?;

    // === 4. Place the order ===
    let clerk = EntityId::new();
    let order = order_handler
        .place_order(PlaceOrder {
            customer_id: customer.id,
            shipping_address_id: address.id,
            billing_address_id: address.id,
            created_by: clerk,
            priority: OrderPriority::High,
            order_type: OrderType::Standard,
            shipping_method: ShippingMethod::Ground,
            currency: "USD".to_string(),
            required_date: None,
            items: vec![NewOrderItem {
                product_id: lamp.id,
                product_sku: lamp.sku.clone(),
                product_name: lamp.name.clone(),
                quantity: 3,
                unit_price: lamp.pricing.price,
                discount_amount: Money::new(dec!(5.00)),
                tax_rate: lamp.pricing.tax_rate,
                weight: lamp.physical.weight,
            }],
            shipping_amount: Some(Money::new(dec!(12.00))),
        })
        .await?;

    let quote = order_handler.quote(order.id).await?;
    tracing::info!(
        order_number = %order.order_number,
        total = %order.total_amount,
        engine_total = %quote.total_amount,
        tax_rows = quote.tax_breakdown.len(),
        discount_rows = quote.discount_breakdown.len(),
        shipping_weight = calculate_shipping_weight(&order),
        "Order priced"
    );

    customer_handler
        .handle(customer.id, CustomerCommand::UseCredit { amount: order.total_amount })
        .await?;

    // === 5. Walk the lifecycle ===
    for status in [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::Processing] {
        order_handler
            .handle(order.id, OrderCommand::ChangeStatus { status, reason: None }, clerk)
            .await?;
    }

    let item_id = order.items[0].id;
    order_handler
        .handle(order.id, OrderCommand::ShipItem { item_id, quantity: 3 }, clerk)
        .await?;
    order_handler
        .handle(
            order.id,
            OrderCommand::SetTracking {
                tracking_number: "1Z999AA10123456784".to_string(),
                carrier: "UPS".to_string(),
            },
            clerk,
        )
        .await?;
    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        order_handler
            .handle(order.id, OrderCommand::ChangeStatus { status, reason: Some("carrier scan".to_string()) }, clerk)
            .await?;
    }

    let paid = order_handler
        .handle(order.id, OrderCommand::RecordPayment { amount: order.total_amount }, clerk)
        .await?;
    customer_handler
        .handle(customer.id, CustomerCommand::ReleaseCredit { amount: paid.paid_amount })
        .await?;

    // === 6. Validate and report ===
    let report = order_handler.validate(order.id).await?;
    tracing::info!(
        is_valid = report.is_valid,
        errors = ?report.errors,
        warnings = ?report.warnings,
        "Order validation report"
    );

    // An illegal jump is rejected and leaves the stored order alone
    if let Err(error) = order_handler
        .handle(order.id, OrderCommand::ChangeStatus { status: OrderStatus::Pending, reason: None }, clerk)
        .await
    {
        tracing::info!(kind = ?error.kind(), error = %error, "Rejected as expected");
    }

    for record in audit.for_entity(order.id).await {
        tracing::info!(
            from = %record.previous_status,
            to = %record.new_status,
            at = %record.at,
            "Audit"
        );
    }

    tracing::info!(
        status = %paid.status,
        payment_status = %paid.payment_status,
        "✅ Demo complete"
    );
    Ok(())
}
