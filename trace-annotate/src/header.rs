use trace_core::consts::INFO_DESCRIPTION;
use trace_core::models::VcfLine;

///
/// The `##INFO` definition of the annotation key.
///
pub fn info_header_line(tag: &str) -> String {
    format!(
        "##INFO=<ID={},Number=1,Type=String,Description=\"{}\">",
        tag, INFO_DESCRIPTION
    )
}

///
/// Whether a meta line already defines INFO key `tag`.
///
pub fn defines_info(line: &str, tag: &str) -> bool {
    line.strip_prefix("##INFO=<ID=")
        .and_then(|rest| rest.strip_prefix(tag))
        .is_some_and(|rest| rest.starts_with(',') || rest.starts_with('>'))
}

pub fn has_info_header(lines: &[VcfLine], tag: &str) -> bool {
    lines.iter().any(|line| match line {
        VcfLine::Meta(text) => defines_info(text, tag),
        _ => false,
    })
}
