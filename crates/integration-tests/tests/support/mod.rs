#![allow(dead_code)]

pub mod api_app;
pub mod provider_mock;
