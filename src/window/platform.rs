//! OS-level color-key transparency. Only Windows exposes it; elsewhere the
//! window stays borderless and topmost and masked pixels show the key color.

use std::ffi::c_void;

use crate::chroma::KeyColor;
use crate::error::WindowError;

/// Pack a key color the way Win32 COLORREF expects it (0x00BBGGRR)
pub fn colorref_value(key: KeyColor) -> u32 {
    key.r() as u32 | (key.g() as u32) << 8 | (key.b() as u32) << 16
}

#[cfg(windows)]
pub fn apply_color_key(handle: *mut c_void, key: KeyColor) -> Result<(), WindowError> {
    use windows::Win32::Foundation::{COLORREF, HWND};
    use windows::Win32::UI::WindowsAndMessaging::{
        GetWindowLongW, SetLayeredWindowAttributes, SetWindowLongW, GWL_EXSTYLE, LWA_COLORKEY,
        WS_EX_LAYERED, WS_EX_TOPMOST,
    };

    let hwnd = HWND(handle);
    let failed = |e: windows::core::Error| WindowError::ColorKeyFailed {
        reason: e.to_string(),
    };

    unsafe {
        let style = GetWindowLongW(hwnd, GWL_EXSTYLE);
        SetWindowLongW(
            hwnd,
            GWL_EXSTYLE,
            style | (WS_EX_LAYERED.0 | WS_EX_TOPMOST.0) as i32,
        );
        SetLayeredWindowAttributes(hwnd, COLORREF(colorref_value(key)), 0, LWA_COLORKEY)
            .map_err(failed)?;
    }
    keep_topmost(handle, None)
}

/// Re-assert topmost z-order, optionally moving the window without resizing it
#[cfg(windows)]
pub fn keep_topmost(handle: *mut c_void, position: Option<(i32, i32)>) -> Result<(), WindowError> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        SetWindowPos, HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    };

    let (x, y, flags) = match position {
        Some((x, y)) => (x, y, SWP_NOSIZE | SWP_NOACTIVATE),
        None => (0, 0, SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE),
    };
    unsafe {
        SetWindowPos(HWND(handle), HWND_TOPMOST, x, y, 0, 0, flags).map_err(|e| {
            WindowError::UpdateFailed {
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(not(windows))]
pub fn apply_color_key(_handle: *mut c_void, key: KeyColor) -> Result<(), WindowError> {
    use std::sync::Once;
    static UNSUPPORTED: Once = Once::new();

    UNSUPPORTED.call_once(|| {
        tracing::warn!(
            "OS-level color keying is unavailable on this platform; pixels matching {} stay visible",
            key
        );
    });
    Ok(())
}

#[cfg(not(windows))]
pub fn keep_topmost(_handle: *mut c_void, _position: Option<(i32, i32)>) -> Result<(), WindowError> {
    Ok(())
}
