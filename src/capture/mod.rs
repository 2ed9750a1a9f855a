//! Platform-specific pointer capture
//!
//! This module provides the pointer device capability, the platform
//! adapters implementing it, and an in-memory device.

pub mod device;
pub mod input;
pub mod registry;
pub mod virtual_device;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
use crate::capture::windows::input as platform;

use std::sync::Arc;

// Re-export the capability
pub use device::{MoveHandler, PointerDevice, PointerError, PointerResult, SubscriptionId};

// Re-export input types
pub use input::{CursorPoint, HookDecision, InputCapture, MoveEvent, ScreenBounds};

pub use registry::HookRegistry;
pub use virtual_device::VirtualPointer;

/// Pointer device for the current platform
pub fn default_device() -> PointerResult<Arc<dyn PointerDevice>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(platform::WindowsPointerDevice::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(PointerError::Unsupported)
    }
}
