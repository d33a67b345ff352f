use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("shader compilation failed: {0}")]
    Shader(String),

    #[error("pipeline setup failed: {0}")]
    Pipeline(String),
}
