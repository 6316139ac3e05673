//! Inline HTML rendering: one span per byte, colored and with a hover tooltip when a region
//! owns the byte, followed by the stylesheet those spans rely on.

use std::fmt::Write;

use log::trace;

use crate::err::Result;
use crate::region::RegionLookup;
use crate::utils::push_escaped_html;

pub const CONTAINER_CLASS: &str = "hexlayout-highlighted";

const STYLESHEET: &str = r#"<style>
  .hexlayout-highlighted {
    font-family: monospace;
    line-height: 1.5;
  }
  .byte {
    padding: 2px;
    margin: 1px;
  }
  .field {
    border-radius: 3px;
    font-weight: bold;
  }
  .tooltip {
    position: relative;
    display: inline-block;
  }
  .tooltip .tooltiptext {
    visibility: hidden;
    background-color: rgba(0,0,0,0.8);
    color: white;
    text-align: center;
    padding: 5px;
    border-radius: 6px;
    position: absolute;
    z-index: 1;
    bottom: 125%;
    left: 50%;
    margin-left: -60px;
    opacity: 0;
    transition: opacity 0.3s;
  }
  .tooltip:hover .tooltiptext {
    visibility: visible;
    opacity: 1;
  }
</style>"#;

/// Renders `data` as a `<div>` of byte spans plus a `<style>` block.
///
/// Offsets passed to `lookup` are relative to `data`. Hex is lowercase.
pub fn render_html(data: &[u8], lookup: Option<&dyn RegionLookup>) -> Result<String> {
    trace!("rendering 0x{:x} bytes as html", data.len());

    // Each styled byte takes a couple hundred bytes of markup.
    let mut html = String::with_capacity(data.len() * 160 + STYLESHEET.len() + 64);
    writeln!(html, "<div class=\"{}\">", CONTAINER_CLASS)?;

    for (offset, byte) in data.iter().enumerate() {
        match lookup.and_then(|l| l.region_at(offset)) {
            Some(region) => {
                write!(
                    html,
                    "<span class=\"tooltip\"><span class=\"byte field\" style=\"background-color: {}; color: {};\">{:02x}</span><span class=\"tooltiptext\">",
                    region.color,
                    region.color.contrast_text(),
                    byte
                )?;
                push_escaped_html(&region.describe(), &mut html);
                html.push_str("</span></span> ");
            }
            None => write!(html, "<span class=\"byte\">{:02x}</span> ", byte)?,
        }
    }

    html.push_str("</div>\n");
    html.push_str(STYLESHEET);

    Ok(html)
}
