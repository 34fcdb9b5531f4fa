//! # Voxel Task System
//!
//! Background work run by the streaming scheduler's workers. Everything here
//! is CPU-only and safe to run off the main thread.

pub mod chunk_generation_task;
