//! End-to-end tests driving the REST transport against an in-memory server.

mod helpers;

mod container_test;
mod model_test;
