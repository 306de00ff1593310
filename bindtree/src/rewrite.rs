//! Textual post-processing of translator output.
//!
//! The translator conservatively wraps C function-pointer typedefs in an
//! `Option`, even where callers require the bare type.  When a binding sets
//! `remove_fnptr_opts`, every such wrapper is unwrapped to the inner
//! function type.

/// Unwrap every non-overlapping `Option<extern "C" fn …>` occurrence,
/// including payloads spanning multiple lines.  Fully-qualified spellings
/// (`::std::option::Option`, `::core::option::Option`) are recognized too.
/// `Option`s around anything other than an extern function type are left
/// alone.
pub fn remove_fnptr_options(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("Option<") {
        // Extend the match backwards over a fully-qualified path.
        let mut start = idx;
        for prefix in ["::std::option::", "::core::option::"] {
            if rest[..idx].ends_with(prefix) {
                start = idx - prefix.len();
                break;
            }
        }
        let open_end = idx + "Option<".len();
        match balanced_payload(&rest[open_end..]) {
            Some(payload) if is_extern_fn(payload) => {
                out.push_str(&rest[..start]);
                out.push_str(payload);
                // +1 skips the closing `>`.
                rest = &rest[open_end + payload.len() + 1..];
            }
            _ => {
                out.push_str(&rest[..open_end]);
                rest = &rest[open_end..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Text up to the `>` matching an already-consumed `<`, counting nested
/// angle brackets and skipping the `>` of `->` arrows.  `None` if the
/// bracket never closes.
fn balanced_payload(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut depth = 1usize;
    for (i, b) in bytes.iter().enumerate() {
        match *b {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_extern_fn(payload: &str) -> bool {
    let t = payload.trim_start();
    let t = t.strip_prefix("unsafe ").unwrap_or(t);
    t.starts_with("extern \"C\" fn")
}
