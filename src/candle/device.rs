//! Mapping from device identifiers to candle devices.

use candle_core::Device;

use crate::error::{DocExpandError, Result};
use crate::expansion::DeviceSpec;

/// Open the candle device named by `spec`.
pub fn to_device(spec: DeviceSpec) -> Result<Device> {
    match spec {
        DeviceSpec::Cpu => Ok(Device::Cpu),
        DeviceSpec::Cuda(ordinal) => Device::new_cuda(ordinal)
            .map_err(|e| DocExpandError::config(format!("CUDA device {ordinal} unavailable: {e}"))),
        DeviceSpec::Metal(ordinal) => Device::new_metal(ordinal).map_err(|e| {
            DocExpandError::config(format!("Metal device {ordinal} unavailable: {e}"))
        }),
    }
}
