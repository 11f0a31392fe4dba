//! Render Module - Map document and HTML page
//!
//! Semua teks dari data (nama lokasi, instruksi, pesan error) wajib lewat
//! `escape_html` sebelum masuk ke markup.

pub mod map;
pub mod page;

pub use map::{build_map_spec, render_map, MapSpec};
pub use page::{render_index, PageView};

/// Escape text for HTML element content and attribute values
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
