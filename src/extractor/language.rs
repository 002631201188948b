use scraper::{Html, Selector};
use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// Language the page declares for itself via `<html lang>` or a
/// `content-language` meta tag, reduced to its primary subtag.
pub fn declared_language(document: &Html) -> Option<String> {
    let html_lang = Selector::parse("html[lang]").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("lang"))
            .and_then(primary_subtag)
    });
    if html_lang.is_some() {
        return html_lang;
    }

    let selector = Selector::parse("meta[http-equiv]").ok()?;
    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("content-language"))
        })
        .find_map(|element| element.value().attr("content").and_then(primary_subtag))
}

fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_', ',']).next()?.trim();
    if primary.is_empty() {
        return None;
    }
    Some(primary.to_ascii_lowercase())
}

pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().len() < MIN_TEXT_LENGTH {
        return None;
    }

    if let Some(info) = detect(text)
        && info.confidence() >= MIN_CONFIDENCE
    {
        return Some(lang_to_code(info.lang()));
    }

    None
}

fn lang_to_code(lang: Lang) -> String {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Heb => "he",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Tha => "th",
        Lang::Vie => "vi",
        other => return other.code().to_string(),
    };
    code.to_string()
}
