//! Effects - network work declared by the reducer

use crate::state::PendingDetail;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog { api_base: String },
    LoadDetail { generation: u64, url: String },
    LoadDescription {
        generation: u64,
        api_base: String,
        detail: PendingDetail,
    },
    LoadSprite { name: String, url: String },
}
