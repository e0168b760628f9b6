#![allow(dead_code)]

pub mod helpers;
pub mod range_server;
