use std::sync::LazyLock;

use regex::Regex;

use super::types::EpisodeDescriptor;

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\] ?").unwrap());

/// Remove bracketed stage directions from a spoken line.
///
/// Stripping repeats until no `[` is left; an unclosed `[` drops the rest of
/// the line. Surrounding whitespace is left as is, so the result may be
/// blank.
pub fn strip_annotations(raw: &str) -> String {
    let mut line = raw.to_string();
    while line.contains('[') {
        let stripped = ANNOTATION_RE.replace_all(&line, "");
        if stripped.len() == line.len() {
            if let Some(idx) = line.find('[') {
                line.truncate(idx);
            }
            break;
        }
        line = stripped.into_owned();
    }
    line
}

/// Stable identifier `{season}_{episode}_{title}` for output naming.
/// Commas are dropped before spaces become underscores.
pub fn derive_id(episode: &EpisodeDescriptor) -> String {
    format!(
        "{}_{}_{}",
        episode.season,
        episode.episode_number,
        episode.title.replace(',', "").replace(' ', "_")
    )
}

// ── Tests ──
