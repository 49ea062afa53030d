//! The form request test harness.
//!
//! [`TestFormRequest`] drives one form request type through validation and
//! authorization without booting an application: tests hand it payloads,
//! route parameters, headers, an acting user and a gate, and assert on
//! what the request does with them.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use serde_json::Value;

use crate::auth::gate::{DenyAll, Gate, GateSpy};
use crate::auth::{TestUser, UserResolver};
use crate::outcome::ValidationOutcome;
use crate::payload::Payload;
use crate::report::ValidationReport;
use crate::request::{FormRequest, RequestView, type_label};

/// A test harness around one [`FormRequest`] type.
///
/// The harness starts with no acting user (a guest), no route parameters,
/// no headers and a gate that denies everything. Builder methods replace
/// those pieces per test.
///
/// # Examples
///
/// ```ignore
/// TestFormRequest::<StoreOrderRequest>::new()
///     .validate(json!({"email": "a@b.com"}))
///     .assert_passes();
///
/// TestFormRequest::<UpdateOrderRequest>::new()
///     .by(TestUser::new("7").with_role("manager"))
///     .with_param("order", 42)
///     .assert_authorized();
/// ```
pub struct TestFormRequest<R: FormRequest> {
    input: Payload,
    params: BTreeMap<String, Value>,
    headers: HeaderMap,
    resolver: UserResolver,
    gate: Box<dyn Gate>,
    _request: PhantomData<fn() -> R>,
}

impl<R: FormRequest> TestFormRequest<R> {
    /// Creates a harness for `R` with nothing configured.
    pub fn new() -> Self {
        Self {
            input: Payload::new(),
            params: BTreeMap::new(),
            headers: HeaderMap::new(),
            resolver: UserResolver::guest(),
            gate: Box::new(DenyAll),
            _request: PhantomData,
        }
    }

    /// Sets the acting user. Passing `None` runs the request as a guest.
    pub fn by(mut self, user: impl Into<Option<TestUser>>) -> Self {
        self.resolver = UserResolver::returning(user.into());
        self
    }

    /// Alias for [`by`](Self::by).
    pub fn acting_as(self, user: impl Into<Option<TestUser>>) -> Self {
        self.by(user)
    }

    /// Installs a resolver that decides the user per guard. The closure
    /// receives the guard name, `None` for the default guard.
    pub fn with_user_resolver(
        mut self,
        resolver: impl Fn(Option<&str>) -> Option<TestUser> + 'static,
    ) -> Self {
        self.resolver = UserResolver::from_fn(resolver);
        self
    }

    /// Sets one route parameter, such as a bound model id.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets several route parameters at once.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    /// Adds a header to the request.
    ///
    /// # Panics
    ///
    /// Panics when the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(err) => panic!("invalid header name \"{name}\": {err}"),
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(err) => panic!("invalid header value for \"{name}\": {err}"),
        };
        self.headers.insert(name, value);
        self
    }

    /// Seeds the request input without running validation, for
    /// authorization hooks that read input fields.
    pub fn with_input(mut self, input: impl Into<Payload>) -> Self {
        self.input = input.into();
        self
    }

    /// Replaces the gate the authorization hook consults. The default gate
    /// denies every ability.
    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    /// Runs validation against a payload and returns the outcome.
    ///
    /// The payload becomes the request input, visible to authorization
    /// hooks afterwards. Validation failures are part of the outcome, never
    /// a panic here.
    ///
    /// # Panics
    ///
    /// Panics when the payload cannot be deserialized into `R` at all,
    /// which means the test itself is malformed.
    pub fn validate(&mut self, payload: impl Into<Payload>) -> ValidationOutcome {
        let payload = payload.into();
        self.input = payload.clone();

        let request = self.deserialize(&payload);
        let errors = request.validate().err();
        tracing::debug!(
            request = type_label::<R>(),
            passed = errors.is_none(),
            failed_fields = errors.as_ref().map_or(0, |e| e.errors().len()),
            "validated payload"
        );

        ValidationOutcome::new(ValidationReport::new(payload, errors), R::rules())
    }

    /// Runs the authorization hook and returns its decision.
    pub fn authorized(&self) -> bool {
        let view = RequestView::new(
            &self.resolver,
            self.gate.as_ref(),
            &self.params,
            &self.input,
            &self.headers,
        );
        let authorized = R::authorize(&view);
        tracing::debug!(
            request = type_label::<R>(),
            authorized,
            "ran authorization hook"
        );
        authorized
    }

    /// Asserts the authorization hook accepts the configured request.
    pub fn assert_authorized(&self) {
        if !self.authorized() {
            panic!("The provided user is not authorized by this request");
        }
    }

    /// Asserts the authorization hook rejects the configured request.
    pub fn assert_not_authorized(&self) {
        if self.authorized() {
            panic!("The provided user is authorized by this request");
        }
    }

    /// Asserts the authorization hook checks the gate exactly once for
    /// `ability` with `args`.
    ///
    /// A recording spy replaces the gate for the run and stays installed
    /// afterwards.
    pub fn assert_calls_gate(&mut self, ability: &str, args: impl Into<Vec<Value>>) {
        self.assert_gate_checked(ability, args.into(), None);
    }

    /// Like [`assert_calls_gate`](Self::assert_calls_gate), and also
    /// asserts the acting user was resolved through `guard`. When no
    /// resolver is installed yet, a guest resolver is installed first.
    pub fn assert_calls_gate_via(
        &mut self,
        ability: &str,
        args: impl Into<Vec<Value>>,
        guard: &str,
    ) {
        self.assert_gate_checked(ability, args.into(), Some(guard));
    }

    fn assert_gate_checked(&mut self, ability: &str, args: Vec<Value>, guard: Option<&str>) {
        let spy = GateSpy::expecting(ability, args);
        self.gate = Box::new(spy.clone());
        if guard.is_some() && !self.resolver.is_installed() {
            self.resolver = UserResolver::returning(None);
        }

        self.authorized();
        spy.verify();

        if let Some(guard) = guard {
            if !self.resolver.resolved_via(guard) {
                panic!(
                    "Expected the user to be resolved through guard \"{guard}\", but the resolved guards were {:?}",
                    self.resolver.resolved_guards(),
                );
            }
        }
    }

    fn deserialize(&self, payload: &Payload) -> R {
        match serde_json::from_value(payload.to_value()) {
            Ok(request) => request,
            Err(err) => panic!(
                "payload could not be deserialized into {}: {err}\npayload:\n{}",
                type_label::<R>(),
                payload.pretty(),
            ),
        }
    }
}

impl<R: FormRequest> Default for TestFormRequest<R> {
    fn default() -> Self {
        Self::new()
    }
}
