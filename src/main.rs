//! # Voxel Streaming Demo Entry Point
//!
//! Calls into the library's `run()` function, which flies a viewpoint across
//! generated terrain and logs what the streaming core does.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() -> anyhow::Result<()> {
    voxel_streaming::run()
}
