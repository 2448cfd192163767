#[cfg(feature = "http")]
mod http;
#[cfg(feature = "signal")]
mod signal;
