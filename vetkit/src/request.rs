//! The form request contract.
//!
//! A form request couples a deserializable, validatable body with the
//! rules it declares and an authorization hook. Implementing [`FormRequest`]
//! is all a type needs to be driven by the test harness.

use std::collections::BTreeMap;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::auth::gate::Gate;
use crate::auth::{TestUser, UserResolver};
use crate::payload::Payload;
use crate::rules::RuleSet;

/// A request type that validates its body and authorizes its caller.
///
/// # Examples
///
/// ```ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use vetkit::prelude::*;
///
/// #[derive(Debug, Deserialize, Validate)]
/// struct UpdateOrderRequest {
///     #[validate(required, email)]
///     email: Option<String>,
/// }
///
/// impl FormRequest for UpdateOrderRequest {
///     fn rules() -> RuleSet {
///         RuleSet::new().field("email", ["required", "email"])
///     }
///
///     fn authorize(request: &RequestView<'_>) -> bool {
///         let order = request.param("order").cloned().unwrap_or_default();
///         request.allows("update-order", &[order])
///     }
/// }
/// ```
pub trait FormRequest: DeserializeOwned + Validate {
    /// The validation rules this request declares, for assertions against
    /// the declaration itself. Defaults to no declared rules.
    fn rules() -> RuleSet {
        RuleSet::new()
    }

    /// Decides whether the caller may make this request. Runs before any
    /// body exists, so it receives a [`RequestView`] rather than `self`.
    /// Defaults to authorized.
    fn authorize(_request: &RequestView<'_>) -> bool {
        true
    }
}

/// The short name of a request type, without its module path.
pub(crate) fn type_label<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

/// What an authorization hook can see of the request under test: the
/// acting user, route parameters, input fields, headers and the gate.
pub struct RequestView<'a> {
    resolver: &'a UserResolver,
    gate: &'a dyn Gate,
    params: &'a BTreeMap<String, Value>,
    input: &'a Payload,
    headers: &'a HeaderMap,
}

impl<'a> RequestView<'a> {
    pub(crate) fn new(
        resolver: &'a UserResolver,
        gate: &'a dyn Gate,
        params: &'a BTreeMap<String, Value>,
        input: &'a Payload,
        headers: &'a HeaderMap,
    ) -> Self {
        Self {
            resolver,
            gate,
            params,
            input,
            headers,
        }
    }

    /// The acting user under the default guard, `None` for a guest.
    pub fn user(&self) -> Option<TestUser> {
        self.resolver.resolve(None)
    }

    /// The acting user under a named guard.
    pub fn user_via(&self, guard: &str) -> Option<TestUser> {
        self.resolver.resolve(Some(guard))
    }

    /// A route parameter, such as a bound model id.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// An input field from the current payload.
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    /// A request header, when present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The gate installed on the harness.
    pub fn gate(&self) -> &dyn Gate {
        self.gate
    }

    /// Checks an ability against the gate for the current default-guard
    /// user.
    pub fn allows(&self, ability: &str, args: &[Value]) -> bool {
        let user = self.user();
        self.gate.check(user.as_ref(), ability, args)
    }
}
