//! Reducer - the list/detail controller as a pure state machine

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.is_loading = true;
            DispatchResult::changed_with(Effect::LoadCatalog {
                api_base: state.api_base.clone(),
            })
        }

        Action::CatalogDidLoad(entries) => {
            tracing::info!(count = entries.len(), "catalog loaded");
            state.entries = entries;
            state.is_loading = false;
            state.clamp_cursor();
            DispatchResult::changed()
        }

        Action::CatalogDidError(_) => {
            state.is_loading = false;
            DispatchResult::changed()
        }

        // ===== Search =====
        Action::SearchOpen => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchClose => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.clamp_cursor();
            DispatchResult::changed()
        }

        Action::SearchQueryChange(query) => {
            if state.search.query == query {
                return DispatchResult::unchanged();
            }
            state.search.query = query;
            state.clamp_cursor();
            DispatchResult::changed()
        }

        Action::CursorSet(index) => {
            if !state.set_cursor(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        // ===== Fetch chain =====
        Action::EntrySelect(entry) => {
            state.generation = state.generation.wrapping_add(1);
            state.is_loading = true;
            state.pending_name = Some(entry.name.clone());
            tracing::debug!(name = %entry.name, generation = state.generation, "selection started");
            DispatchResult::changed_with(Effect::LoadDetail {
                generation: state.generation,
                url: entry.url,
            })
        }

        Action::DetailDidLoad { generation, detail } => {
            if !state.is_current(generation) {
                discard(state, generation, "detail");
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::LoadDescription {
                generation,
                api_base: state.api_base.clone(),
                detail,
            })
        }

        Action::DescriptionDidLoad { generation, record } => {
            if !state.is_current(generation) {
                discard(state, generation, "description");
                return DispatchResult::unchanged();
            }
            let sprite_effect = (!record.image_url.is_empty()).then(|| Effect::LoadSprite {
                name: record.name.clone(),
                url: record.image_url.clone(),
            });
            state.sprite = if sprite_effect.is_some() {
                DataResource::Loading
            } else {
                DataResource::Empty
            };
            state.selected = Some(record);
            state.is_loading = false;
            state.pending_name = None;
            match sprite_effect {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        Action::DetailDidError { generation, .. }
        | Action::DescriptionDidError { generation, .. } => {
            if !state.is_current(generation) {
                discard(state, generation, "error");
                return DispatchResult::unchanged();
            }
            state.is_loading = false;
            state.pending_name = None;
            DispatchResult::changed()
        }

        // ===== Sprite =====
        Action::SpriteDidLoad { name, sprite } => {
            if !is_selected(state, &name) {
                return DispatchResult::unchanged();
            }
            state.sprite = DataResource::Loaded(sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { name, error } => {
            if !is_selected(state, &name) {
                return DispatchResult::unchanged();
            }
            state.sprite = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        Action::Tick => {
            if !state.is_loading {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn discard(state: &AppState, generation: u64, stage: &str) {
    tracing::debug!(
        stage,
        generation,
        current = state.generation,
        "discarding superseded result"
    );
}

fn is_selected(state: &AppState, name: &str) -> bool {
    state
        .selected
        .as_ref()
        .is_some_and(|record| record.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CatalogEntry, DetailRecord, PendingDetail};

    fn pending(id: u32, name: &str) -> PendingDetail {
        PendingDetail {
            id,
            name: name.into(),
            image_url: format!("img{id}.png"),
            types: vec!["grass".into()],
        }
    }

    fn loaded_state() -> AppState {
        AppState {
            entries: vec![
                CatalogEntry::new("bulbasaur", "https://pokeapi.co/api/v2/pokemon/1/"),
                CatalogEntry::new("charmander", "https://pokeapi.co/api/v2/pokemon/4/"),
            ],
            is_loading: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_init_requests_catalog() {
        let mut state = AppState::new("http://localhost:9000");
        let result = reducer(&mut state, Action::Init);
        assert!(result.changed);
        assert!(state.is_loading);
        assert_eq!(
            result.effects,
            vec![Effect::LoadCatalog {
                api_base: "http://localhost:9000".into()
            }]
        );
    }

    #[test]
    fn test_catalog_error_clears_loading() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::CatalogDidError("offline".into()));
        assert!(result.changed);
        assert!(!state.is_loading);
        assert!(state.entries.is_empty());
    }

    #[test]
    fn test_select_bumps_generation_and_keeps_previous_record() {
        let mut state = loaded_state();
        let previous = pending(4, "charmander").with_description("Flame".into());
        state.selected = Some(previous.clone());

        let entry = state.entries[0].clone();
        let result = reducer(&mut state, Action::EntrySelect(entry));

        assert_eq!(state.generation, 1);
        assert!(state.is_loading);
        assert_eq!(state.selected, Some(previous));
        assert_eq!(
            result.effects,
            vec![Effect::LoadDetail {
                generation: 1,
                url: "https://pokeapi.co/api/v2/pokemon/1/".into()
            }]
        );
    }

    #[test]
    fn test_detail_load_chains_description_without_committing() {
        let mut state = loaded_state();
        state.generation = 3;
        state.is_loading = true;

        let result = reducer(
            &mut state,
            Action::DetailDidLoad {
                generation: 3,
                detail: pending(1, "bulbasaur"),
            },
        );

        assert!(state.is_loading);
        assert!(state.selected.is_none());
        assert_eq!(
            result.effects,
            vec![Effect::LoadDescription {
                generation: 3,
                api_base: state.api_base.clone(),
                detail: pending(1, "bulbasaur"),
            }]
        );
    }

    #[test]
    fn test_stale_description_is_discarded() {
        let mut state = loaded_state();
        state.generation = 2;
        state.is_loading = true;

        let stale: DetailRecord = pending(1, "bulbasaur").with_description("old".into());
        let result = reducer(
            &mut state,
            Action::DescriptionDidLoad {
                generation: 1,
                record: stale,
            },
        );

        assert!(!result.changed);
        assert!(result.effects.is_empty());
        assert!(state.selected.is_none());
        assert!(state.is_loading);
    }

    #[test]
    fn test_stale_error_keeps_newer_chain_loading() {
        let mut state = loaded_state();
        state.generation = 2;
        state.is_loading = true;

        let result = reducer(
            &mut state,
            Action::DetailDidError {
                generation: 1,
                error: "timeout".into(),
            },
        );

        assert!(!result.changed);
        assert!(state.is_loading);
    }

    #[test]
    fn test_commit_without_image_skips_sprite() {
        let mut state = loaded_state();
        state.generation = 1;
        let mut detail = pending(1, "bulbasaur");
        detail.image_url.clear();

        let result = reducer(
            &mut state,
            Action::DescriptionDidLoad {
                generation: 1,
                record: detail.with_description(String::new()),
            },
        );

        assert!(result.effects.is_empty());
        assert!(state.sprite.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_sprite_for_other_entry_is_ignored() {
        let mut state = loaded_state();
        state.selected = Some(pending(4, "charmander").with_description(String::new()));
        state.sprite = DataResource::Loading;

        let result = reducer(
            &mut state,
            Action::SpriteDidError {
                name: "bulbasaur".into(),
                error: "404".into(),
            },
        );

        assert!(!result.changed);
        assert!(state.sprite.is_loading());
    }

    #[test]
    fn test_tick_only_rerenders_while_loading() {
        let mut state = loaded_state();
        assert!(!reducer(&mut state, Action::Tick).changed);

        state.is_loading = true;
        assert!(reducer(&mut state, Action::Tick).changed);
        assert_eq!(state.tick, 1);
    }

    #[test]
    fn test_search_cancel_clears_query() {
        let mut state = loaded_state();
        reducer(&mut state, Action::SearchOpen);
        reducer(&mut state, Action::SearchQueryChange("char".into()));
        assert_eq!(state.visible_entries().len(), 1);

        reducer(&mut state, Action::SearchCancel);
        assert!(!state.search.active);
        assert!(state.search.query.is_empty());
        assert_eq!(state.visible_entries().len(), 2);
    }
}
