//! Tests for the agent's HTTP interface and keep-alive.
