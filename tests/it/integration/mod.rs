//! Integration tests for grabkit.
//!
//! These drive a whole `InteractionWorld` through `tick` with scripted
//! controllers and check the ownership protocol end to end.

mod button_tests;
mod device_loss_tests;
mod lifecycle_tests;
mod pointer_tests;
