//! wgpu implementation of the pasture draw backend.
//!
//! Static batches go through a textured pipeline, one vertex buffer per
//! texture; actor parts and bullets through a lit flat-color pipeline with
//! one draw per part.
//!
//! # Invariants
//! - The renderer never sees simulation state, only draw calls.
//! - A batch buffer is re-uploaded only when its generation changes; the
//!   stale buffer is destroyed first.

mod error;
mod gpu;
mod shaders;
mod texture;

pub use error::GpuError;
pub use gpu::{GpuFrame, WgpuRenderer};
pub use texture::{TEXTURE_SIZE, texture_pixels};
