//! # Auth Handler Tests
//!
//! Test suite for registration, login and the permission probe, driven
//! through the real router with `tower::ServiceExt::oneshot`.

mod login;

use crate::test_utils::{promote, register_and_login, send, setup_test_db, test_app};
use axum::http::StatusCode;
use serde_json::json;
