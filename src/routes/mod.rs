//! Router Module Index
//!
//! Routes are split by access level. The authenticated router is wrapped in the auth
//! middleware as a whole, so a mutating endpoint cannot be exposed by accident.
//! Both routers are merged under `/api`; a path may appear in both with different
//! methods (public GET, authenticated PUT/DELETE).

/// Read-only content routes plus the visitor-facing login and contact submission.
pub mod public;

/// Every mutating content route and the admin inbox. Requires a valid bearer token.
pub mod authenticated;
