//! Hands-on checks for a freshly wired strip.

mod self_test;

pub use self_test::{run_self_test, scroll_frame, SelfTestOptions};
