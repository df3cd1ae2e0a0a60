/*
 * stylebridge-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for the stylebridge bundler adapter.
 *
 * This crate provides a trait-based abstraction for the filesystem
 * operations the adapter performs:
 *
 * - NativeRuntime: Full filesystem access using std (default)
 * - Host-provided runtimes: anything implementing SystemRuntime
 */

mod native;
mod traits;

// Re-export core types (API surface)
pub use traits::{PathKind, RuntimeError, RuntimeResult, SystemRuntime};

// Re-export runtime implementations
pub use native::NativeRuntime;

/// Create a default runtime for the current platform.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
