//! wgpu device setup and buffer readback

use anyhow::{Context, Result};
use thiserror::Error;
use wgpu::util::DeviceExt;

/// GPU device initialization errors
#[derive(Debug, Error)]
pub enum GpuDeviceError {
    /// No compatible GPU adapter found
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(String),

    /// Dispatch larger than the device allows
    #[error("Dispatch of {requested} workgroups exceeds device limit {limit}")]
    DispatchTooLarge {
        /// Workgroups needed
        requested: u64,
        /// Device limit per dimension
        limit: u32,
    },
}

/// Adapter, device and queue for advance kernels
///
/// ```ignore
/// # use trueno_frontier::gpu::GpuDevice;
/// let device = GpuDevice::new().await?;
/// println!("{:?}", device.info());
/// ```
#[derive(Debug)]
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

impl GpuDevice {
    /// Whether any adapter can be opened; lets tests skip without a GPU
    pub async fn is_gpu_available() -> bool {
        Self::new().await.is_ok()
    }

    /// Open the highest-performance adapter on any backend
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if no adapter exists or the device request fails
    pub async fn new() -> Result<Self, GpuDeviceError> {
        Self::new_with_backend(wgpu::Backends::all()).await
    }

    /// Open an adapter restricted to `backends`
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if device initialization fails
    pub async fn new_with_backend(backends: wgpu::Backends) -> Result<Self, GpuDeviceError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuDeviceError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("trueno-frontier device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| GpuDeviceError::DeviceRequest(e.to_string()))?;

        tracing::debug!(adapter = ?adapter.get_info().name, "gpu device opened");

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Adapter info (name, backend, ...)
    #[must_use]
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Largest workgroup count per dispatch dimension
    #[must_use]
    pub fn max_workgroups_per_dimension(&self) -> u32 {
        self.device.limits().max_compute_workgroups_per_dimension
    }

    /// Create a buffer initialized with `contents`
    #[must_use]
    pub fn create_buffer_init(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }

    /// Create an uninitialized buffer of `size` bytes
    #[must_use]
    pub fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Copy the first `len` words of `buffer` back to the host
    ///
    /// `buffer` needs `COPY_SRC` usage.
    ///
    /// # Errors
    ///
    /// Returns an error if mapping the staging buffer fails
    pub async fn read_u32s(&self, buffer: &wgpu::Buffer, len: usize) -> Result<Vec<u32>> {
        let size = (len * std::mem::size_of::<u32>()) as u64;
        let staging_buffer = self.create_buffer(
            "Readback Staging",
            size,
            wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_buffer_to_buffer(buffer, 0, &staging_buffer, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();

        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device.poll(wgpu::Maintain::Wait);
        rx.receive()
            .await
            .context("Failed to receive map result")?
            .context("Buffer mapping failed")?;

        let data = buffer_slice.get_mapped_range();
        let values: Vec<u32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging_buffer.unmap();

        Ok(values)
    }

    /// Device reference
    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Queue reference
    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gpu_device_creation() {
        if !GpuDevice::is_gpu_available().await {
            eprintln!("⚠️  Skipping test_gpu_device_creation: GPU not available");
            return;
        }

        let device = GpuDevice::new().await.unwrap();
        assert!(!device.info().name.is_empty());
        assert!(device.max_workgroups_per_dimension() > 0);
    }

    #[tokio::test]
    async fn test_gpu_device_with_no_backend() {
        let device = GpuDevice::new_with_backend(wgpu::Backends::empty()).await;
        assert!(matches!(device, Err(GpuDeviceError::NoAdapter)));
    }

    #[test]
    fn test_gpu_device_error_display() {
        assert_eq!(GpuDeviceError::NoAdapter.to_string(), "No compatible GPU adapter found");

        let err = GpuDeviceError::DispatchTooLarge {
            requested: 70_000,
            limit: 65_535,
        };
        assert_eq!(
            err.to_string(),
            "Dispatch of 70000 workgroups exceeds device limit 65535"
        );
    }

    #[tokio::test]
    async fn test_read_back_buffer() {
        if !GpuDevice::is_gpu_available().await {
            eprintln!("⚠️  Skipping test_read_back_buffer: GPU not available");
            return;
        }

        let device = GpuDevice::new().await.unwrap();
        let data: Vec<u32> = vec![1, 2, 3, 4, 5];
        let buffer = device.create_buffer_init(
            "test_readback",
            bytemuck::cast_slice(&data),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );

        let read = device.read_u32s(&buffer, data.len()).await.unwrap();
        assert_eq!(read, data);
    }
}
