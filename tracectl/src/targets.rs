// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time collection of the tracing targets declared by every linked crate.
//!
//! Declaring a target does not require any initialization code: [`trace_target!`] and
//! [`custom_target!`] drop a [`STarget`] into the [`TRACING_TARGETS`] slice, which
//! [`crate::TracingControl`] reads on creation.
//!
//! [`trace_target!`]: crate::trace_target
//! [`custom_target!`]: crate::custom_target

use crate::LevelFilter;
use linkme::distributed_slice;

/// How a target was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The target is the module path of the declaring module
    Module,
    /// The target is an arbitrary string, used with an explicit `target:` in events
    Custom,
}

/// A tracing target known at link time
pub struct STarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) kind: TargetKind,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}

impl STarget {
    #[doc(hidden)]
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        kind: TargetKind,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name,
            kind,
            level,
            tags,
        }
    }
}

#[distributed_slice]
pub static TRACING_TARGETS: [STarget];

#[doc(hidden)]
#[macro_export]
macro_rules! __declare_target {
    // the const scope gives every static its own linker name
    ($target:expr, $name:expr, $kind:ident, $level:expr, $tags:expr) => {
        const _: () = {
            #[::linkme::distributed_slice($crate::targets::TRACING_TARGETS)]
            static TRACE_TGT: $crate::targets::STarget = $crate::targets::STarget::new(
                $target,
                $name,
                $crate::targets::TargetKind::$kind,
                $level,
                $tags,
            );
        };
    };
}

/// Declare the calling module as a tracing target, with a short name, a default level and
/// tags. The name is itself usable as a tag.
///
/// The calling crate must depend on `linkme`.
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        $crate::__declare_target!(module_path!(), $name, Module, $level, $tags);
    };
}

/// Declare a tracing target which is not a module path, with a default level and tags.
///
/// The calling crate must depend on `linkme`.
#[macro_export]
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        $crate::__declare_target!($target, $target, Custom, $level, $tags);
    };
}

/// Emit a trace event on a custom target.
#[macro_export]
macro_rules! ttrace {
    ($target:expr, $($args:tt)*) => {
        ::tracing::trace!(target: $target, $($args)*)
    };
}
