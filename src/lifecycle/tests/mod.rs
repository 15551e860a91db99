//! Unit and service tests for the lifecycle engine.

mod support;

mod archive_tests;
mod domain_tests;
mod overdue_tests;
mod recurrence_tests;
