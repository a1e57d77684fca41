//! HTTP-level integration tests for the portal API.

mod helpers;

mod auth_test;
mod rbac_test;
mod reset_test;
