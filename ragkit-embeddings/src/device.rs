use serde::{Deserialize, Serialize};

/// Where model inference runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceTarget {
    Accelerated,
    Processor,
}

/// Answers whether an accelerator can be used right now.
pub trait HardwareProbe {
    fn accelerator_available(&self) -> bool;
}

impl DeviceTarget {
    /// Asks `probe` once; nothing is cached between calls.
    pub fn detect(probe: &dyn HardwareProbe) -> Self {
        if probe.accelerator_available() {
            DeviceTarget::Accelerated
        } else {
            DeviceTarget::Processor
        }
    }

    #[cfg(feature = "candle")]
    pub fn device(self) -> Result<candle_core::Device, crate::EmbeddingProviderError> {
        match self {
            DeviceTarget::Processor => Ok(candle_core::Device::Cpu),
            DeviceTarget::Accelerated => accelerator_device(),
        }
    }
}

#[cfg(all(feature = "candle", feature = "cuda"))]
fn accelerator_device() -> Result<candle_core::Device, crate::EmbeddingProviderError> {
    candle_core::Device::new_cuda(0)
        .map_err(|err| crate::EmbeddingProviderError::Device(format!("cuda: {err}")))
}

#[cfg(all(feature = "candle", feature = "metal", not(feature = "cuda")))]
fn accelerator_device() -> Result<candle_core::Device, crate::EmbeddingProviderError> {
    candle_core::Device::new_metal(0)
        .map_err(|err| crate::EmbeddingProviderError::Device(format!("metal: {err}")))
}

#[cfg(all(feature = "candle", not(any(feature = "cuda", feature = "metal"))))]
fn accelerator_device() -> Result<candle_core::Device, crate::EmbeddingProviderError> {
    Err(crate::EmbeddingProviderError::Device(
        "built without cuda or metal support".to_string(),
    ))
}

/// Probes the machine through the compiled-in candle backends.
///
/// Without the `cuda` or `metal` feature this always reports no accelerator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl HardwareProbe for SystemProbe {
    #[cfg(feature = "candle")]
    fn accelerator_available(&self) -> bool {
        accelerator_device().is_ok()
    }

    #[cfg(not(feature = "candle"))]
    fn accelerator_available(&self) -> bool {
        false
    }
}
