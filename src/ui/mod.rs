// src/ui/mod.rs

// Console output of a finished report, as styled text or JSON.
mod report_view;

pub use report_view::{render_json, render_report};
