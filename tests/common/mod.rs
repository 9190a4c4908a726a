//! Shared fixtures for the integration tests.
//!
//! One commerce-flavored metamodel exercising every mapping shape the
//! translator understands: basic properties, a component, a to-one
//! association, many-to-many collections, a secondary table and a
//! union-subclass hierarchy.

use relmap::config::Config;
use relmap::dialect::GenericDialect;
use relmap::engine::Engine;
use relmap::metamodel::{
    BasicType, CollectionBuilder, ComponentBuilder, EntityBuilder, Metamodel, MetamodelBuilder,
};
use relmap::session::UnavailableConnectionAccess;

pub fn commerce_model() -> Metamodel {
    MetamodelBuilder::new()
        .entity(
            EntityBuilder::new("Customer", "CUSTOMER")
                .id("id", BasicType::Long, "ID")
                .property("name", BasicType::String, "NAME")
                .component(
                    "address",
                    ComponentBuilder::new("address")
                        .field("city", BasicType::String, "CITY")
                        .field("zip", BasicType::String, "ZIP"),
                ),
        )
        .entity(
            EntityBuilder::new("Purchase", "PURCHASE")
                .id("id", BasicType::Long, "ID")
                .property("status", BasicType::String, "STATUS")
                .property("total", BasicType::Long, "TOTAL")
                .many_to_one("customer", "Customer", &["CUST_ID"])
                .collection("tags"),
        )
        .entity(
            EntityBuilder::new("Tag", "TAG")
                .id("id", BasicType::Long, "ID")
                .property("name", BasicType::String, "NAME"),
        )
        .entity(
            EntityBuilder::new("Employee", "EMPLOYEE")
                .id("id", BasicType::Long, "ID")
                .property("name", BasicType::String, "NAME")
                .property("department", BasicType::String, "DEPARTMENT")
                .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
        )
        .entity(
            EntityBuilder::new("Payment", "PAYMENT")
                .id("id", BasicType::Long, "ID")
                .property("amount", BasicType::Long, "AMOUNT")
                .union_tables(&["CREDIT_PAYMENT", "CASH_PAYMENT"])
                .collection("flags"),
        )
        .collection(
            CollectionBuilder::new("Purchase", "tags")
                .table("PURCHASE_TAGS")
                .key(&["PURCHASE_ID"])
                .many_to_many("Tag", &["TAG_ID"]),
        )
        .collection(
            CollectionBuilder::new("Payment", "flags")
                .table("PAYMENT_TAGS")
                .key(&["PAYMENT_ID"])
                .many_to_many("Tag", &["TAG_ID"]),
        )
        .build()
        .expect("fixture model should build")
}

/// Engine over the commerce model with default configuration. Id tables
/// are registered without DDL; tests drive sessions explicitly.
pub fn commerce_engine() -> Engine {
    engine_with_config(Config::default())
}

pub fn engine_with_config(config: Config) -> Engine {
    Engine::build(
        commerce_model(),
        Box::new(GenericDialect::new()),
        config,
        &mut UnavailableConnectionAccess,
    )
}
