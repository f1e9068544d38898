//! Flutter-facing bridge over `cms_core`.

pub mod api;
