mod escape;
mod hex_string;

pub use self::escape::push_escaped_html;
pub use self::hex_string::parse_hex_string;
