//! # Committee Node Test Suite
//!
//! Cross-crate tests and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Flows spanning several crates
//! │   ├── anchored_state.rs   # store digest → state block → dispatch
//! │   ├── concurrent_dispatch.rs
//! │   └── feed.rs
//! └── benches/           # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cn-tests
//! cargo bench -p cn-tests
//! ```

pub mod integration;
