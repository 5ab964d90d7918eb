use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use super::clean::strip_annotations;
use super::scope::{element_text, find_heading, scope_after, select_in_scope};
use super::types::{DialogueLine, EpisodeDescriptor, Transcript};
use crate::error::{Result, ScrapeError};

static SPEAKER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

pub fn article_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e:?}")))
}

/// The article body of a transcript page.
pub fn find_article<'a>(document: &'a Html, selector: &Selector) -> Result<ElementRef<'a>> {
    document
        .select(selector)
        .next()
        .ok_or_else(|| ScrapeError::Structure("article body not found".to_string()))
}

/// One transcript per episode, in the order given.
///
/// A single episode takes the whole article. Several episodes split the
/// article by its "Part 1".."Part N" headings; the k-th episode gets the
/// content under "Part k".
pub fn extract(article: ElementRef, episodes: &[EpisodeDescriptor]) -> Result<Vec<Transcript>> {
    match episodes {
        [] => Ok(Vec::new()),
        [episode] => Ok(vec![Transcript {
            episode: episode.clone(),
            lines: parse_scope(&[article]),
        }]),
        _ => episodes
            .iter()
            .zip(1u32..)
            .map(|(episode, part)| -> Result<Transcript> {
                let scope = part_scope(article, part)?;
                if scope.is_empty() {
                    warn!("Part {} of {:?} has no content", part, episode.title);
                }
                Ok(Transcript {
                    episode: episode.clone(),
                    lines: parse_scope(&scope),
                })
            })
            .collect(),
    }
}

fn part_scope(article: ElementRef<'_>, part: u32) -> Result<Vec<ElementRef<'_>>> {
    let heading = find_heading(article, |text| is_part_heading(text, part))
        .ok_or_else(|| ScrapeError::Structure(format!("heading \"Part {}\" not found", part)))?;
    Ok(scope_after(heading))
}

/// `Part {part}` at the start of the text, not followed by a word character.
fn is_part_heading(text: &str, part: u32) -> bool {
    text.strip_prefix("Part ")
        .and_then(|rest| rest.strip_prefix(part.to_string().as_str()))
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Speaker/line pairs under the scope, in document order.
pub fn parse_scope(scope: &[ElementRef]) -> Vec<DialogueLine> {
    let lines: Vec<DialogueLine> = select_in_scope(scope, &SPEAKER)
        .into_iter()
        .filter_map(dialogue_line)
        .collect();
    debug!(lines = lines.len(), "Parsed scope");
    lines
}

/// `None` for cues with nothing spoken after them, or only stage directions.
fn dialogue_line(label: ElementRef) -> Option<DialogueLine> {
    let content = label.next_siblings().find(|n| match n.value() {
        Node::Element(_) => true,
        Node::Text(t) => !t.trim().is_empty(),
        _ => false,
    })?;

    let spoken = match content.value() {
        Node::Text(t) => {
            let s: &str = t;
            s.to_string()
        }
        _ => element_text(ElementRef::wrap(content)?),
    };

    let line = strip_annotations(spoken.trim_matches(|c: char| c == '\n' || c == '\r'));
    if line.trim().is_empty() {
        return None;
    }

    let speaker = element_text(label)
        .trim_matches(|c: char| c == '\n' || c == '\r')
        .to_string();
    Some(DialogueLine { speaker, line })
}

// ── Tests ──
