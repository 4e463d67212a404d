//! The home screen: three shelves loaded together.

use derive_more::Display;
use reda_database::CombinedFile;

/// The three shelves of the home screen, as loaded by
/// [`load_home_page_data`](super::RedaService::load_home_page_data).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomePageData {
    pub recently_added: Vec<CombinedFile>,
    pub starred: Vec<CombinedFile>,
    pub continue_reading: Vec<CombinedFile>,
}

/// A shelf of the home screen.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    #[display("Continue Reading")]
    ContinueReading,
    #[display("Recently Added")]
    RecentlyAdded,
    #[display("Starred")]
    Starred,
}

impl Section {
    /// Display order on the home screen.
    pub const ORDER: [Section; 3] = [Self::ContinueReading, Self::RecentlyAdded, Self::Starred];
}

/// Everything the home screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeFeed {
    /// Number of documents in the whole library.
    pub count: u64,
    pub data: HomePageData,
}

impl HomeFeed {
    /// An empty library shows an import prompt instead of shelves.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn section(&self, section: Section) -> &[CombinedFile] {
        match section {
            Section::ContinueReading => &self.data.continue_reading,
            Section::RecentlyAdded => &self.data.recently_added,
            Section::Starred => &self.data.starred,
        }
    }

    /// The shelves in display order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &[CombinedFile])> {
        Section::ORDER.into_iter().map(|section| (section, self.section(section)))
    }
}
