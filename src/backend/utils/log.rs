// src/backend/utils/log.rs
//! Canister debug logging. Inside the canister lines go to the replica debug
//! log through `ic_cdk::println!`; natively (unit tests) they go to stdio.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Info => "📝 INFO",
            Level::Warn => "⚠️ WARN",
            Level::Error => "🔥 ERROR",
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn emit(level: Level, message: String) {
    ic_cdk::println!("{}: {}", level.marker(), message);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(level: Level, message: String) {
    match level {
        Level::Error | Level::Warn => eprintln!("{}: {}", level.marker(), message),
        Level::Info => println!("{}: {}", level.marker(), message),
    }
}

macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Info, format!($($arg)*))
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Warn, format!($($arg)*))
    };
}

macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Error, format!($($arg)*))
    };
}
