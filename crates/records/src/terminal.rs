//! Terminal title lookup.

/// Known terminals, matched by substring against the upper-cased port.
const TERMINALS: [(&str, &str); 3] = [
    ("BALBOA", "TERMINAL PACIFICO - BALBOA"),
    ("CRISTOBAL", "TERMINAL ATLANTICO - CRISTOBAL"),
    ("MANZANILLO", "MANZANILLO INTERNATIONAL TERMINAL"),
];

/// Resolves the terminal title printed on a pass for `port`.
///
/// Matching ignores case and surrounding whitespace. Unknown ports fall back
/// to `"TERMINAL {port}"` with the trimmed port as written.
#[must_use]
pub fn terminal_title(port: &str) -> String {
    let port = port.trim();
    let upper = port.to_uppercase();
    TERMINALS
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map_or_else(|| format!("TERMINAL {port}"), |(_, title)| (*title).to_owned())
}
