//! Tabletop API - backend for a browser-based tabletop RPG toolkit
//!
//! This crate provides:
//! - Sign-in through Google and Facebook, with bearer JWT sessions
//! - Bulk upload of images, spritesheets and tilemaps with reference resolution
//! - Owner-scoped campaigns, characters and encounters
//! - Content-addressed public reads of stored assets
//! - A `WebSocket` relay for `WebRTC` peer signaling

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
pub mod utils;
