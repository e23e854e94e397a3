//! Driver status codes.
//!
//! Every Andor export returns an `unsigned int`. `DRV_SUCCESS` is the only
//! good value; everything else is mapped to a named variant when the SDK
//! headers document it and kept verbatim otherwise.

use crate::error::{AndorError, AndorResult};
use andor_sys::*;
use std::fmt;

/// Decoded driver return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverStatus {
    /// `DRV_SUCCESS`
    Success,
    /// `DRV_VXDNOTINSTALLED`: the kernel driver is missing.
    VxdNotInstalled,
    /// `DRV_ERROR_ACK`: no acknowledgement from the card.
    ErrorAck,
    /// `DRV_P1INVALID`: first argument out of range.
    P1Invalid,
    /// `DRV_NOT_INITIALIZED`: `Initialize` has not succeeded yet.
    NotInitialized,
    /// `DRV_ERROR_NOCAMERA`
    NoCamera,
    /// `DRV_NOT_SUPPORTED`
    NotSupported,
    /// `DRV_NOT_AVAILABLE`
    NotAvailable,
    /// A code this crate has no name for.
    Other(u32),
}

impl DriverStatus {
    /// Decode a raw return code.
    pub fn from_code(code: u32) -> Self {
        match code {
            DRV_SUCCESS => Self::Success,
            DRV_VXDNOTINSTALLED => Self::VxdNotInstalled,
            DRV_ERROR_ACK => Self::ErrorAck,
            DRV_P1INVALID => Self::P1Invalid,
            DRV_NOT_INITIALIZED => Self::NotInitialized,
            DRV_ERROR_NOCAMERA => Self::NoCamera,
            DRV_NOT_SUPPORTED => Self::NotSupported,
            DRV_NOT_AVAILABLE => Self::NotAvailable,
            other => Self::Other(other),
        }
    }

    /// Raw return code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Success => DRV_SUCCESS,
            Self::VxdNotInstalled => DRV_VXDNOTINSTALLED,
            Self::ErrorAck => DRV_ERROR_ACK,
            Self::P1Invalid => DRV_P1INVALID,
            Self::NotInitialized => DRV_NOT_INITIALIZED,
            Self::NoCamera => DRV_ERROR_NOCAMERA,
            Self::NotSupported => DRV_NOT_SUPPORTED,
            Self::NotAvailable => DRV_NOT_AVAILABLE,
            Self::Other(code) => *code,
        }
    }

    /// Header name of the code, e.g. `DRV_SUCCESS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "DRV_SUCCESS",
            Self::VxdNotInstalled => "DRV_VXDNOTINSTALLED",
            Self::ErrorAck => "DRV_ERROR_ACK",
            Self::P1Invalid => "DRV_P1INVALID",
            Self::NotInitialized => "DRV_NOT_INITIALIZED",
            Self::NoCamera => "DRV_ERROR_NOCAMERA",
            Self::NotSupported => "DRV_NOT_SUPPORTED",
            Self::NotAvailable => "DRV_NOT_AVAILABLE",
            Self::Other(_) => "DRV_UNKNOWN",
        }
    }

    /// True only for `DRV_SUCCESS`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

/// Turn a raw return code from `function` into a `Result`.
pub fn check(function: &'static str, code: u32) -> AndorResult<()> {
    match DriverStatus::from_code(code) {
        DriverStatus::Success => Ok(()),
        status => {
            tracing::debug!(function, code, "driver call returned error status");
            Err(AndorError::Driver { function, status })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_both_ways() {
        for code in [20002, 20003, 20013, 20066, 20075, 20990, 20991, 20992] {
            let status = DriverStatus::from_code(code);
            assert!(!matches!(status, DriverStatus::Other(_)), "{code}");
            assert_eq!(status.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = DriverStatus::from_code(20999);
        assert_eq!(status, DriverStatus::Other(20999));
        assert_eq!(status.to_string(), "DRV_UNKNOWN (20999)");
    }

    #[test]
    fn test_check() {
        assert!(check("Initialize", DRV_SUCCESS).is_ok());
        match check("Initialize", DRV_VXDNOTINSTALLED) {
            Err(AndorError::Driver { function, status }) => {
                assert_eq!(function, "Initialize");
                assert_eq!(status, DriverStatus::VxdNotInstalled);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
