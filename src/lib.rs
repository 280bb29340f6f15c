//! Arcade block-breaker mechanics built on exact segment-intersection
//! collision queries.

pub mod algebra_2d;
pub mod environment;
pub mod game;
pub mod listeners;
pub mod mechanics;
