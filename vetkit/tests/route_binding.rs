//! Integration tests for route bindings and their form request assertions.

use vetkit::prelude::*;

// Fixture form requests

#[derive(Debug, Deserialize, Validate)]
struct StoreOrderRequest {
    #[validate(required, email)]
    #[allow(dead_code)]
    email: Option<String>,
}

impl FormRequest for StoreOrderRequest {
    fn rules() -> RuleSet {
        RuleSet::new().field("email", ["required", "email"])
    }
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateOrderRequest {
    #[allow(dead_code)]
    note: Option<String>,
}

impl FormRequest for UpdateOrderRequest {}

#[derive(Debug, Deserialize, Validate)]
struct ListOrdersRequest {
    #[allow(dead_code)]
    page: Option<u32>,
}

impl FormRequest for ListOrdersRequest {}

fn app_routes() -> RouteTable {
    RouteTable::new()
        .register(
            RouteBinding::get("/orders")
                .named("orders.index")
                .to("OrdersController", "index"),
        )
        .register(
            RouteBinding::post("/orders")
                .named("orders.store")
                .to("OrdersController", "store")
                .form_request::<StoreOrderRequest>(),
        )
        .register(
            RouteBinding::put("/orders/:order")
                .named("orders.update")
                .to("OrdersController", "update")
                .form_request::<UpdateOrderRequest>(),
        )
        .register(
            RouteBinding::post("/orders/import")
                .named("orders.import")
                .to_invokable("ImportOrdersController")
                .form_request::<StoreOrderRequest>()
                .form_request::<ListOrdersRequest>(),
        )
}

// Named route lookups

#[test]
fn test_named_route_uses_its_form_request() {
    assert_route_uses_form_request::<StoreOrderRequest>(&app_routes(), "orders.store");
    assert_route_uses_form_request::<UpdateOrderRequest>(&app_routes(), "orders.update");
}

#[test]
#[should_panic(
    expected = "Action \"store\" does not have validation using the \"ListOrdersRequest\" Form Request."
)]
fn test_named_route_with_a_different_form_request_fails() {
    assert_route_uses_form_request::<ListOrdersRequest>(&app_routes(), "orders.store");
}

#[test]
#[should_panic(expected = "Route \"orders.destroy\" is not defined.")]
fn test_unknown_route_name_fails() {
    assert_route_uses_form_request::<StoreOrderRequest>(&app_routes(), "orders.destroy");
}

#[test]
#[should_panic(
    expected = "Route \"orders.store\" is defined multiple times, route names should be unique."
)]
fn test_duplicate_route_names_fail() {
    let table = app_routes().register(
        RouteBinding::post("/orders/bulk")
            .named("orders.store")
            .to("OrdersController", "bulkStore"),
    );

    assert_route_uses_form_request::<StoreOrderRequest>(&table, "orders.store");
}

// Current route

#[test]
fn test_current_route_uses_its_form_request() {
    let table = app_routes().with_current("orders.update");
    assert_current_route_uses_form_request::<UpdateOrderRequest>(&table);
}

#[test]
#[should_panic(expected = "No current route is set on the route table.")]
fn test_current_route_assertion_requires_a_current_route() {
    assert_current_route_uses_form_request::<StoreOrderRequest>(&app_routes());
}

// Controller actions

#[test]
fn test_action_uses_its_form_request() {
    assert_action_uses_form_request::<StoreOrderRequest>(
        &app_routes(),
        "OrdersController",
        "store",
    );
}

#[test]
#[should_panic(expected = "Controller action could not be found: OrdersController@destroy")]
fn test_unknown_action_fails() {
    assert_action_uses_form_request::<StoreOrderRequest>(
        &app_routes(),
        "OrdersController",
        "destroy",
    );
}

#[test]
#[should_panic(
    expected = "Action \"index\" does not have validation using the \"StoreOrderRequest\" Form Request."
)]
fn test_action_without_the_form_request_fails() {
    assert_action_uses_form_request::<StoreOrderRequest>(
        &app_routes(),
        "OrdersController",
        "index",
    );
}

// Invokable controllers and multi-request actions

#[test]
fn test_invokable_action_declares_both_form_requests() {
    let table = app_routes();
    assert_action_uses_form_request::<StoreOrderRequest>(&table, "ImportOrdersController", "__invoke");
    assert_action_uses_form_request::<ListOrdersRequest>(&table, "ImportOrdersController", "__invoke");
    assert_route_uses_form_request::<ListOrdersRequest>(&table, "orders.import");
}

// Table queries

#[test]
fn test_table_registration_order_and_lookup() {
    let table = app_routes();

    assert_eq!(table.len(), 4);
    assert!(!table.is_empty());
    assert_eq!(table.routes()[1].name(), Some("orders.store"));

    let binding = table.find_by_name("orders.update").unwrap();
    assert_eq!(binding.method(), &Method::PUT);
    assert_eq!(binding.path(), "/orders/:order");
    assert_eq!(binding.action_ref(), "OrdersController@update");
    assert_eq!(binding.request_types().len(), 1);
}
