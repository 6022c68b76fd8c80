//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `gatehouse_core::defaults`.

use gatehouse_core::defaults;

/// Generate default value functions that forward to gatehouse_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_method_enabled     => DEFAULT_METHOD_ENABLED: bool,
    default_method_score       => DEFAULT_METHOD_SCORE: i32,
    default_store_timeout_secs => DEFAULT_STORE_TIMEOUT_SECS: u64,
    password_hash_hex_len      => PASSWORD_HASH_HEX_LEN: usize,
}

default_string_fns! {
    default_realm => DEFAULT_REALM,
}
