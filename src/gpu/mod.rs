//! Device-side advance (feature `gpu`)
//!
//! The block-mapped kernel as a WGSL compute shader on wgpu: one workgroup
//! per block of input elements, workgroup-shared degree scan, rightmost
//! binary search per output slot.
//!
//! # Architecture
//!
//! - `device`: adapter and queue setup, staging readback
//! - `buffer`: CSR topology upload
//! - `advance`: pipeline setup and dispatch
//!
//! ```bash
//! cargo build --features gpu
//! ```

mod advance;
mod buffer;
mod device;

pub use advance::gpu_advance_block_mapped;
pub use buffer::GpuCsrBuffers;
pub use device::{GpuDevice, GpuDeviceError};
