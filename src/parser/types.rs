use std::collections::HashMap;

/// One episode as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeDescriptor {
    pub season: u32,
    pub episode_number: u32,
    pub title: String,
}

/// A transcript page and the episodes whose dialogue it carries.
/// The Nth episode corresponds to "Part N" on a multi-part page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub link: String,
    pub episodes: Vec<EpisodeDescriptor>,
}

/// Page links in order of first appearance on the index.
#[derive(Debug, Default, Clone)]
pub struct LinkIndex {
    entries: Vec<PageEntry>,
    positions: HashMap<String, usize>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, link: &str, episode: EpisodeDescriptor) {
        match self.positions.get(link) {
            Some(&idx) => self.entries[idx].episodes.push(episode),
            None => {
                self.positions.insert(link.to_string(), self.entries.len());
                self.entries.push(PageEntry {
                    link: link.to_string(),
                    episodes: vec![episode],
                });
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, link: &str) -> Option<&[EpisodeDescriptor]> {
        self.positions
            .get(link)
            .map(|&idx| self.entries[idx].episodes.as_slice())
    }

    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn page_count(&self) -> usize {
        self.entries.len()
    }

    pub fn episode_count(&self) -> usize {
        self.entries.iter().map(|e| e.episodes.len()).sum()
    }

    pub fn contains_episode(&self, season: u32, episode_number: u32) -> bool {
        self.entries
            .iter()
            .flat_map(|e| &e.episodes)
            .any(|ep| ep.season == season && ep.episode_number == episode_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

/// Dialogue of one episode in conversation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub episode: EpisodeDescriptor,
    pub lines: Vec<DialogueLine>,
}

// ── Tests ──
