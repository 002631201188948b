use crate::config::FilterConfig;

/// Language stage verdict.
///
/// A detected language passes when it contains any configured code as a
/// substring, so `en` admits `en-gb` as well as an unrelated tag such as
/// `ben`. An undetected language passes unless strict-language is set.
pub fn passes(config: &FilterConfig, detected: Option<&str>) -> bool {
    match detected {
        None => !config.strict_language(),
        Some(language) => config
            .languages()
            .iter()
            .any(|code| language.contains(code.as_str())),
    }
}
