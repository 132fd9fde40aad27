//! Logging dispatch. Forwards to `defmt` and/or `log` depending on the
//! enabled features; expands to nothing when neither is selected.

macro_rules! debug {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($args)*);
        #[cfg(feature = "log")]
        ::log::debug!($($args)*);
    }};
}

macro_rules! info {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($args)*);
        #[cfg(feature = "log")]
        ::log::info!($($args)*);
    }};
}

// Named `warning` because `warn` cannot be re-imported by name; it is
// ambiguous with the built-in `warn` attribute.
macro_rules! warning {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($args)*);
        #[cfg(feature = "log")]
        ::log::warn!($($args)*);
    }};
}

pub(crate) use {debug, info, warning};
