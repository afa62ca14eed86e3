/* Identifier casing and Go lexical helpers */

use heck::{ToSnakeCase, ToUpperCamelCase};

/* Go keywords and predeclared identifiers. None of these may be handed out. */
pub const GO_RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var", "any", "append", "bool", "byte", "cap", "clear",
    "close", "comparable", "complex", "complex64", "complex128", "copy", "delete", "error",
    "false", "float32", "float64", "imag", "int", "int8", "int16", "int32", "int64", "iota", "len",
    "make", "max", "min", "new", "nil", "panic", "print", "println", "real", "recover", "rune",
    "string", "true", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

/* Words golint expects to stay fully upper-cased */
const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/* Words of `name` in their schema spelling; boundaries follow heck's snake casing */
fn words(name: &str) -> Vec<String> {
    let mut originals = name.chars().filter(|c| c.is_alphanumeric());
    name.to_snake_case()
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let original: String = originals.by_ref().take(word.chars().count()).collect();
            if original.to_lowercase() == word { original } else { word.to_string() }
        })
        .collect()
}

/* MAX_RETRIES style names are recased word by word */
fn is_screaming_snake(name: &str) -> bool {
    name.contains('_') && !name.chars().any(char::is_lowercase)
}

fn is_upper_run(word: &str) -> bool {
    word.chars().count() > 1 && word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn case_word(word: &str, keep_upper: bool) -> String {
    let upper = word.to_ascii_uppercase();
    if COMMON_INITIALISMS.contains(&upper.as_str()) {
        upper
    } else if keep_upper && is_upper_run(word) {
        word.to_string()
    } else {
        word.to_upper_camel_case()
    }
}

/// Exported Go casing of a schema name: `user_id` and `userId` both become
/// `UserID`; upper-case runs such as `KV` are kept as written.
pub fn go_case(name: &str) -> String {
    let keep_upper = !is_screaming_snake(name);
    let cased: String = words(name).iter().map(|w| case_word(w, keep_upper)).collect();
    if cased.is_empty() { name.to_string() } else { cased }
}

/// Unexported casing for locals and parameters: `user_id` becomes `userID`.
pub fn lower_camel(name: &str) -> String {
    let keep_upper = !is_screaming_snake(name);
    let words = words(name);
    let Some((first, rest)) = words.split_first() else {
        return name.to_string();
    };
    let mut out = first.to_lowercase();
    for word in rest {
        out.push_str(&case_word(word, keep_upper));
    }
    out
}

/// Whether `ident` is usable as an exported Go identifier: an ASCII
/// uppercase letter followed by letters and digits only.
pub fn is_exported_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Go interpreted string literal for `value`.
pub fn go_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
