//! Application state - the single view aggregate owned by the reducer

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::api::API_BASE;
use crate::sprite::SpriteData;

/// Lightweight catalog reference: a name plus the locator of its full record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Fields produced by the detail fetch, still waiting for a description.
///
/// Never shown to the view; the only way out is [`PendingDetail::with_description`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PendingDetail {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
}

impl PendingDetail {
    pub fn with_description(self, description: String) -> DetailRecord {
        DetailRecord {
            id: self.id,
            name: self.name,
            image_url: self.image_url,
            types: self.types,
            description,
        }
    }
}

/// A fully composed entry, as displayed in the detail panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailRecord {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
    pub description: String,
}

impl DetailRecord {
    pub fn types_label(&self) -> String {
        self.types.join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    /// Search bar has keyboard focus
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    pub api_base: String,
    pub entries: Vec<CatalogEntry>,
    pub search: SearchState,
    /// Index into the visible list
    pub cursor: usize,
    pub selected: Option<DetailRecord>,
    pub is_loading: bool,
    /// Bumped on every selection; outcomes of older chains are discarded.
    pub generation: u64,
    /// Name of the entry whose fetch chain is in flight
    pub pending_name: Option<String>,
    pub sprite: DataResource<SpriteData>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl AppState {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            entries: Vec::new(),
            search: SearchState::default(),
            cursor: 0,
            selected: None,
            is_loading: true,
            generation: 0,
            pending_name: None,
            sprite: DataResource::Empty,
            tick: 0,
        }
    }

    /// Entries matching the current search text, in fetch order.
    pub fn visible_entries(&self) -> Vec<&CatalogEntry> {
        filter_entries(&self.entries, &self.search.query)
    }

    pub fn cursor_entry(&self) -> Option<&CatalogEntry> {
        self.visible_entries().get(self.cursor).copied()
    }

    pub fn set_cursor(&mut self, index: usize) -> bool {
        let len = self.visible_entries().len();
        if len == 0 {
            self.cursor = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.cursor {
            self.cursor = bounded;
            return true;
        }
        false
    }

    pub fn clamp_cursor(&mut self) {
        if self.cursor >= self.visible_entries().len() {
            self.cursor = 0;
        }
    }

    /// True while an outcome tagged with `generation` is still wanted.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Case-insensitive substring filter over entry names; an empty query keeps everything.
pub fn filter_entries<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    if query.is_empty() {
        return entries.iter().collect();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .collect()
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Dex")
                .entry("total", ron_string(&self.entries.len()))
                .entry("visible", ron_string(&self.visible_entries().len()))
                .entry("cursor", ron_string(&self.cursor))
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active)),
            DebugSection::new("Selection")
                .entry(
                    "selected",
                    ron_string(&self.selected.as_ref().map(|record| record.name.clone())),
                )
                .entry("pending", ron_string(&self.pending_name))
                .entry("generation", ron_string(&self.generation)),
            DebugSection::new("Status")
                .entry("loading", ron_string(&self.is_loading))
                .entry("sprite_loading", ron_string(&self.sprite.is_loading()))
                .entry("api_base", ron_string(&self.api_base)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kanto() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("bulbasaur", "https://pokeapi.co/api/v2/pokemon/1/"),
            CatalogEntry::new("charmander", "https://pokeapi.co/api/v2/pokemon/4/"),
            CatalogEntry::new("charmeleon", "https://pokeapi.co/api/v2/pokemon/5/"),
            CatalogEntry::new("squirtle", "https://pokeapi.co/api/v2/pokemon/7/"),
        ]
    }

    #[test]
    fn test_initial_state_is_loading_with_nothing_selected() {
        let state = AppState::default();
        assert!(state.is_loading);
        assert!(state.entries.is_empty());
        assert!(state.search.query.is_empty());
        assert!(state.selected.is_none());
        assert_eq!(state.api_base, API_BASE);
    }

    #[test]
    fn test_empty_query_keeps_full_list() {
        let entries = kanto();
        let visible = filter_entries(&entries, "");
        assert_eq!(visible.len(), entries.len());
    }

    #[test]
    fn test_filter_is_case_insensitive_and_order_preserving() {
        let entries = kanto();
        let names: Vec<_> = filter_entries(&entries, "ChAr")
            .into_iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["charmander", "charmeleon"]);
    }

    #[test]
    fn test_filter_matches_inner_substring() {
        let entries = kanto();
        let names: Vec<_> = filter_entries(&entries, "saur")
            .into_iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["bulbasaur"]);
    }

    #[test]
    fn test_filter_does_not_trim_query() {
        let entries = kanto();
        assert!(filter_entries(&entries, " char").is_empty());
    }

    #[test]
    fn test_cursor_clamps_to_visible_list() {
        let mut state = AppState {
            entries: kanto(),
            ..Default::default()
        };
        assert!(state.set_cursor(10));
        assert_eq!(state.cursor, 3);

        state.search.query = "char".into();
        state.clamp_cursor();
        assert_eq!(state.cursor, 0);
        assert_eq!(state.cursor_entry().map(|e| e.name.as_str()), Some("charmander"));
    }

    #[test]
    fn test_pending_detail_composes_full_record() {
        let pending = PendingDetail {
            id: 1,
            name: "bulbasaur".into(),
            image_url: "img1.png".into(),
            types: vec!["grass".into(), "poison".into()],
        };
        let record = pending.with_description("A strange seed...".into());
        assert_eq!(record.id, 1);
        assert_eq!(record.types_label(), "grass, poison");
        assert_eq!(record.description, "A strange seed...");
    }
}
