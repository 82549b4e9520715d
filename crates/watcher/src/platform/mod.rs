//! Platform-specific notification services

#[cfg(target_os = "linux")]
pub mod linux;
