pub mod auth;
pub mod harness;
pub mod outcome;
pub mod payload;
pub mod report;
pub mod request;
pub mod route;
pub mod rules;

pub mod prelude {
    pub use crate::auth::TestUser;
    pub use crate::auth::gate::{AllowAll, DenyAll, Gate, GateSpy, StubGate};
    pub use crate::harness::TestFormRequest;
    pub use crate::outcome::{Expected, ValidationOutcome};
    pub use crate::payload::Payload;
    pub use crate::report::ValidationReport;
    pub use crate::request::{FormRequest, RequestView};
    pub use crate::route::{
        RouteBinding, RouteTable, assert_action_uses_form_request,
        assert_current_route_uses_form_request, assert_route_uses_form_request,
    };
    pub use crate::rules::{Rule, RuleSet};

    pub use http::Method;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
    pub use validator::Validate;
}
