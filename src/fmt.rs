//! Logging shim.
//!
//! With the `defmt` feature these forward to `defmt`; without it (host
//! tests) they expand to an empty block so the core carries no logging backend.

#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
}

// Expand to an empty block so a call still works as a match-arm
// expression.

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_work_in_expression_position() {
        for result in [Ok::<u8, u8>(1), Err(3)] {
            let () = match result {
                Ok(_v) => info!("ok {}", _v),
                Err(_e) => warn!("err {}", _e),
            };
        }
        trace!("statement");
        debug!("statement {}", 1);
    }
}
