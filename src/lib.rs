#![allow(async_fn_in_trait)]

pub mod api;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod integrity;
pub mod liveness;
pub mod playback;
pub mod storage;
