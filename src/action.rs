//! Actions - input events and fetch outcomes

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{CatalogEntry, DetailRecord, PendingDetail};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    /// Mount: load the catalog
    Init,
    CatalogDidLoad(Vec<CatalogEntry>),
    CatalogDidError(String),

    // ===== Search category =====
    SearchOpen,
    /// Leave the search bar, keeping the filter
    SearchClose,
    /// Leave the search bar and clear the filter
    SearchCancel,
    SearchQueryChange(String),

    // ===== Cursor category =====
    CursorSet(usize),

    // ===== Entry category =====
    /// Start a fetch chain for this entry
    EntrySelect(CatalogEntry),

    // ===== Fetch chain results, tagged with the selection generation =====
    DetailDidLoad { generation: u64, detail: PendingDetail },
    DetailDidError { generation: u64, error: String },
    DescriptionDidLoad { generation: u64, record: DetailRecord },
    DescriptionDidError { generation: u64, error: String },

    SpriteDidLoad { name: String, sprite: SpriteData },
    SpriteDidError { name: String, error: String },

    /// Force a re-render (cursor movement inside the search bar)
    Render,
    Tick,
    Quit,
}
