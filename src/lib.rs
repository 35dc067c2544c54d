//! meetpoint - REST backend for a meetup scheduling application.
//!
//! This crate provides an HTTP API with features including:
//! - Account registration, authentication, and profile updates
//! - Meetup creation and management with banner uploads
//! - Subscriptions with organizer mail notifications

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod locale;
pub mod logging;
pub mod mail;
pub mod model;
pub mod repository;
pub mod service;
pub mod subscriber;
pub mod web;
