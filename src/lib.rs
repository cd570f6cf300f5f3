// Library surface for the binary and for headless/integration tests.
// The session engine has no terminal dependencies; app and ui sit on top.
pub mod app;
pub mod app_dirs;
pub mod bank;
pub mod clock;
pub mod config;
pub mod evaluator;
pub mod exercise;
pub mod logging;
pub mod progress;
pub mod response;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod ui;
pub mod util;
