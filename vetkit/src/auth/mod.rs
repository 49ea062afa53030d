//! Test users and user resolution for authorization checks.
//!
//! Authorization hooks see the acting user through a [`UserResolver`]
//! installed on the harness. The resolver records every guard it is asked
//! to resolve, so tests can assert which guard an authorization path used.

pub mod gate;

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

/// A user for authorization tests.
///
/// # Examples
///
/// ```
/// use vetkit::auth::TestUser;
///
/// let user = TestUser::new("42")
///     .with_role("admin")
///     .with_attr("team", "billing");
///
/// assert!(user.has_role("admin"));
/// assert_eq!(user.attr("team"), Some(&"billing".into()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TestUser {
    id: String,
    roles: Vec<String>,
    attributes: BTreeMap<String, Value>,
}

impl TestUser {
    /// Creates a user with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Grants a role to the user.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Attaches an arbitrary attribute to the user.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Resolves the acting user for an authorization run.
///
/// The default resolver is a guest resolver that is not considered
/// installed; harness builders replace it with an installed one. Every
/// resolution is recorded together with the guard it was requested
/// through, `None` meaning the default guard.
pub struct UserResolver {
    resolve: Box<dyn Fn(Option<&str>) -> Option<TestUser>>,
    installed: bool,
    resolved_guards: RefCell<Vec<Option<String>>>,
}

impl UserResolver {
    /// A resolver that answers every guard with no user.
    pub fn guest() -> Self {
        Self {
            resolve: Box::new(|_| None),
            installed: false,
            resolved_guards: RefCell::new(Vec::new()),
        }
    }

    /// An installed resolver that always returns the given user.
    pub fn returning(user: Option<TestUser>) -> Self {
        Self {
            resolve: Box::new(move |_| user.clone()),
            installed: true,
            resolved_guards: RefCell::new(Vec::new()),
        }
    }

    /// An installed resolver backed by a closure. The closure receives the
    /// guard name, `None` for the default guard.
    pub fn from_fn(resolve: impl Fn(Option<&str>) -> Option<TestUser> + 'static) -> Self {
        Self {
            resolve: Box::new(resolve),
            installed: true,
            resolved_guards: RefCell::new(Vec::new()),
        }
    }

    /// Resolves the user for a guard, recording the request.
    pub fn resolve(&self, guard: Option<&str>) -> Option<TestUser> {
        self.resolved_guards
            .borrow_mut()
            .push(guard.map(str::to_string));
        (self.resolve)(guard)
    }

    /// Whether a resolver has been installed explicitly.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// The guards resolved so far, in call order.
    pub fn resolved_guards(&self) -> Vec<Option<String>> {
        self.resolved_guards.borrow().clone()
    }

    /// Whether any resolution went through the given guard.
    pub fn resolved_via(&self, guard: &str) -> bool {
        self.resolved_guards
            .borrow()
            .iter()
            .any(|g| g.as_deref() == Some(guard))
    }
}

impl Default for UserResolver {
    fn default() -> Self {
        Self::guest()
    }
}
