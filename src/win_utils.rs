use std::ffi::OsStr;
use std::os::windows::prelude::OsStrExt;

use windows::Win32::Foundation::GetLastError;



// Helper function to convert Rust string slices to null-terminated UTF-16 Vec<u16>
pub fn wide_string (s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

/// same as above but without the terminating null, for apis that take an explicit length
pub fn wide_chars (s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().collect()
}

pub fn last_error_string () -> String {
    format! ("{:?}", unsafe { GetLastError() })
}
