//! Integration tests against mock HTTP servers

mod end_to_end;
mod rest_store;
mod upstream;
