//! Dotted field paths for error reports: `$`, `$.a.b`, `$.tags[2]`.

pub(crate) const ROOT: &str = "$";

pub(crate) fn field(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

pub(crate) fn index(parent: &str, i: usize) -> String {
    format!("{parent}[{i}]")
}
