//! Tests for archive extraction, the import pipeline and its queue.

mod queue_tests;
mod support;
