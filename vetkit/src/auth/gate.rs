//! Gates decide abilities for authorization hooks.
//!
//! A harness carries one [`Gate`]. Tests swap in whichever implementation
//! the scenario needs: the permissive [`AllowAll`], the closed [`DenyAll`],
//! a closure-backed [`StubGate`], or a [`GateSpy`] that records checks so a
//! test can verify the hook consulted the gate.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::auth::TestUser;

/// Answers ability checks during authorization.
pub trait Gate {
    /// Decides whether `user` may perform `ability` with the given arguments.
    fn check(&self, user: Option<&TestUser>, ability: &str, args: &[Value]) -> bool;
}

/// A gate that allows every ability.
pub struct AllowAll;

impl Gate for AllowAll {
    fn check(&self, _user: Option<&TestUser>, _ability: &str, _args: &[Value]) -> bool {
        true
    }
}

/// A gate that denies every ability. This is the harness default, matching
/// a gate with no abilities defined.
pub struct DenyAll;

impl Gate for DenyAll {
    fn check(&self, _user: Option<&TestUser>, _ability: &str, _args: &[Value]) -> bool {
        false
    }
}

/// A gate backed by a closure.
///
/// # Examples
///
/// ```
/// use vetkit::auth::TestUser;
/// use vetkit::auth::gate::{Gate, StubGate};
///
/// let gate = StubGate::new(|user, ability, _args| {
///     ability == "edit-posts" && user.is_some_and(|u| u.has_role("editor"))
/// });
///
/// let editor = TestUser::new("1").with_role("editor");
/// assert!(gate.check(Some(&editor), "edit-posts", &[]));
/// assert!(!gate.check(None, "edit-posts", &[]));
/// ```
pub struct StubGate {
    decide: Box<dyn Fn(Option<&TestUser>, &str, &[Value]) -> bool>,
}

impl StubGate {
    pub fn new(decide: impl Fn(Option<&TestUser>, &str, &[Value]) -> bool + 'static) -> Self {
        Self {
            decide: Box::new(decide),
        }
    }
}

impl Gate for StubGate {
    fn check(&self, user: Option<&TestUser>, ability: &str, args: &[Value]) -> bool {
        (self.decide)(user, ability, args)
    }
}

/// One recorded gate check.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCall {
    /// The id of the user the check ran for, `None` for a guest.
    pub user: Option<String>,
    pub ability: String,
    pub args: Vec<Value>,
}

/// A gate that records every check and answers `true` only for the one
/// expected ability and argument list.
///
/// Clones share their recording, so a test can install one clone on the
/// harness and verify through the other.
#[derive(Clone)]
pub struct GateSpy {
    state: Rc<SpyState>,
}

struct SpyState {
    ability: String,
    args: Vec<Value>,
    calls: RefCell<Vec<GateCall>>,
}

impl GateSpy {
    /// Creates a spy expecting exactly one check of `ability` with `args`.
    pub fn expecting(ability: impl Into<String>, args: impl Into<Vec<Value>>) -> Self {
        Self {
            state: Rc::new(SpyState {
                ability: ability.into(),
                args: args.into(),
                calls: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The checks recorded so far, in call order.
    pub fn calls(&self) -> Vec<GateCall> {
        self.state.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.borrow().len()
    }

    /// Asserts the gate was checked exactly once, with the expected ability
    /// and arguments.
    ///
    /// # Panics
    ///
    /// Panics when the gate was never checked, checked more than once, or
    /// checked with a different ability or argument list.
    pub fn verify(&self) {
        let calls = self.state.calls.borrow();
        match calls.as_slice() {
            [] => panic!(
                "Expected the gate to be checked for ability \"{}\" exactly once, but it was never checked.",
                self.state.ability
            ),
            [call] => {
                if call.ability != self.state.ability || call.args != self.state.args {
                    panic!(
                        "The gate was checked with different arguments than expected.\n  expected: check(\"{}\", {})\n  actual:   check(\"{}\", {})",
                        self.state.ability,
                        render_args(&self.state.args),
                        call.ability,
                        render_args(&call.args),
                    );
                }
            }
            calls => panic!(
                "Expected the gate to be checked for ability \"{}\" exactly once, but it was checked {} times.",
                self.state.ability,
                calls.len()
            ),
        }
    }
}

impl Gate for GateSpy {
    fn check(&self, user: Option<&TestUser>, ability: &str, args: &[Value]) -> bool {
        let call = GateCall {
            user: user.map(|u| u.id().to_string()),
            ability: ability.to_string(),
            args: args.to_vec(),
        };
        tracing::debug!(ability, user = call.user.as_deref(), "gate check recorded");
        self.state.calls.borrow_mut().push(call);
        ability == self.state.ability && args == self.state.args
    }
}

fn render_args(args: &[Value]) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| format!("{args:?}"))
}
