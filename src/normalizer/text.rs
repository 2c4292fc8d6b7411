use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("valid url regex"));

/// Zero-width space, non-joiner, joiner and the byte-order mark.
const INVISIBLE_CHARS: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|ch| !INVISIBLE_CHARS.contains(ch))
        .collect()
}

/// Lower-cased host of the first http(s) URL in `text`.
///
/// Later URLs are ignored. Anything that fails to parse is treated as "no
/// domain" rather than an error.
pub fn extract_domain(text: &str) -> Option<String> {
    let raw = URL_REGEX.find(text)?;
    let candidate = normalize_url(raw.as_str());
    match Url::parse(&candidate) {
        Ok(url) => url
            .host_str()
            .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty()),
        Err(err) => {
            tracing::debug!(target: "normalizer", error = %err, "ignoring unparseable url");
            None
        }
    }
}

fn normalize_url(raw: &str) -> String {
    let mut cleaned = raw.trim_end_matches(char::is_whitespace).to_string();
    while let Some(last) = cleaned.chars().last() {
        let should_trim = match last {
            ')' => !cleaned.contains('('),
            ']' => !cleaned.contains('['),
            '}' => !cleaned.contains('{'),
            '>' => !cleaned.contains('<'),
            '"' => count_char(&cleaned, '"') % 2 == 1,
            '\'' => count_char(&cleaned, '\'') % 2 == 1,
            ',' | '.' | '!' | '?' | ';' | ':' => true,
            _ => false,
        };
        if should_trim {
            cleaned.pop();
        } else {
            break;
        }
    }
    cleaned
}

fn count_char(value: &str, needle: char) -> usize {
    value.chars().filter(|ch| *ch == needle).count()
}
