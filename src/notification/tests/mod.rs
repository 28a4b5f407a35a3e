//! Unit tests for the notification context.

mod generator_tests;
