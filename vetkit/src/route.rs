//! Route bindings and form-request binding assertions.
//!
//! A [`RouteTable`] records which controller action serves each route and
//! which form-request parameters that action declares. The free assertion
//! functions check a route or action against an expected [`FormRequest`]
//! type, the binding every validated endpoint is supposed to carry.

use std::fmt;

use http::Method;

use crate::request::{FormRequest, type_label};

/// A registered route: where it lives, what handles it, and which
/// form-request types the handling action takes.
///
/// # Examples
///
/// ```ignore
/// let binding = RouteBinding::post("/orders")
///     .named("orders.store")
///     .to("OrdersController", "store")
///     .form_request::<StoreOrderRequest>();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBinding {
    method: Method,
    path: String,
    name: Option<String>,
    controller: String,
    action: String,
    request_types: Vec<&'static str>,
}

impl RouteBinding {
    /// Creates a binding for the given method and path pattern.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            name: None,
            controller: String::new(),
            action: String::new(),
            request_types: Vec::new(),
        }
    }

    /// Creates a GET binding.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST binding.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a PUT binding.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a DELETE binding.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Names the route. Route names are expected to be unique.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Points the route at a controller action.
    pub fn to(mut self, controller: impl Into<String>, action: impl Into<String>) -> Self {
        self.controller = controller.into();
        self.action = action.into();
        self
    }

    /// Points the route at an invokable controller.
    pub fn to_invokable(self, controller: impl Into<String>) -> Self {
        self.to(controller, "__invoke")
    }

    /// Records that the action takes a parameter of form-request type `R`.
    pub fn form_request<R: FormRequest>(mut self) -> Self {
        self.request_types.push(std::any::type_name::<R>());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// The controller reference in `Controller@action` form.
    pub fn action_ref(&self) -> String {
        format!("{}@{}", self.controller, self.action)
    }

    /// The recorded form-request type names of the action's parameters.
    pub fn request_types(&self) -> &[&'static str] {
        &self.request_types
    }

    /// Whether the action declares a parameter of form-request type `R`.
    pub fn declares<R: FormRequest>(&self) -> bool {
        self.request_types.contains(&std::any::type_name::<R>())
    }
}

/// Why a named route lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLookupError {
    /// No route carries the name.
    NotDefined(String),
    /// More than one route carries the name.
    NotUnique(String),
}

impl fmt::Display for RouteLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLookupError::NotDefined(name) => {
                write!(f, "Route \"{name}\" is not defined.")
            }
            RouteLookupError::NotUnique(name) => {
                write!(
                    f,
                    "Route \"{name}\" is defined multiple times, route names should be unique."
                )
            }
        }
    }
}

impl std::error::Error for RouteLookupError {}

/// The routes a test declares, plus the one currently being dispatched.
///
/// Tests build the table explicitly, mirroring what the application's
/// router would register.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    bindings: Vec<RouteBinding>,
    current: Option<usize>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding to the table.
    pub fn register(mut self, binding: RouteBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Marks the named route as the one currently being dispatched.
    ///
    /// # Panics
    ///
    /// Panics when no registered route has that name.
    pub fn with_current(mut self, name: &str) -> Self {
        match self.bindings.iter().position(|b| b.name() == Some(name)) {
            Some(index) => self.current = Some(index),
            None => panic!("{}", RouteLookupError::NotDefined(name.to_string())),
        }
        self
    }

    /// The currently dispatched route, when one is set.
    pub fn current(&self) -> Option<&RouteBinding> {
        self.current.and_then(|index| self.bindings.get(index))
    }

    /// Looks a route up by its unique name.
    pub fn find_by_name(&self, name: &str) -> Result<&RouteBinding, RouteLookupError> {
        let mut matches = self.bindings.iter().filter(|b| b.name() == Some(name));
        match (matches.next(), matches.next()) {
            (Some(binding), None) => Ok(binding),
            (Some(_), Some(_)) => Err(RouteLookupError::NotUnique(name.to_string())),
            (None, _) => Err(RouteLookupError::NotDefined(name.to_string())),
        }
    }

    /// Finds the binding registered for a controller action.
    pub fn find_action(&self, controller: &str, action: &str) -> Option<&RouteBinding> {
        self.bindings
            .iter()
            .find(|b| b.controller() == controller && b.action() == action)
    }

    /// All registered bindings, in registration order.
    pub fn routes(&self) -> &[RouteBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Asserts the route registered under `route_name` declares form-request
/// type `R` on its action.
///
/// # Panics
///
/// Panics when the route is missing or ambiguous, or when the action does
/// not declare `R`.
pub fn assert_route_uses_form_request<R: FormRequest>(table: &RouteTable, route_name: &str) {
    let binding = match table.find_by_name(route_name) {
        Ok(binding) => binding,
        Err(err) => panic!("{err}"),
    };
    tracing::debug!(
        route = route_name,
        action = %binding.action_ref(),
        "checking form request binding"
    );
    assert_binding_declares::<R>(binding);
}

/// Asserts the currently dispatched route declares form-request type `R`.
///
/// # Panics
///
/// Panics when no current route is set or the action does not declare `R`.
pub fn assert_current_route_uses_form_request<R: FormRequest>(table: &RouteTable) {
    let Some(binding) = table.current() else {
        panic!("No current route is set on the route table.");
    };
    assert_binding_declares::<R>(binding);
}

/// Asserts the given controller action is registered and declares
/// form-request type `R`.
///
/// # Panics
///
/// Panics when the action is not registered or does not declare `R`.
pub fn assert_action_uses_form_request<R: FormRequest>(
    table: &RouteTable,
    controller: &str,
    action: &str,
) {
    let Some(binding) = table.find_action(controller, action) else {
        panic!("Controller action could not be found: {controller}@{action}");
    };
    assert_binding_declares::<R>(binding);
}

fn assert_binding_declares<R: FormRequest>(binding: &RouteBinding) {
    if !binding.declares::<R>() {
        panic!(
            "Action \"{}\" does not have validation using the \"{}\" Form Request.",
            binding.action(),
            type_label::<R>(),
        );
    }
}
