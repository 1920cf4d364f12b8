//! Pokedex TUI - browse the Kanto catalog from PokeAPI
//!
//! This library exposes the app's modules for the binary and for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod logging;
pub mod reducer;
pub mod sprite;
pub mod sprite_backend;
pub mod state;
