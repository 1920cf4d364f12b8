//! Pokedex TUI - browse the first-generation catalog

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame, Terminal,
};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api;
use pokedex::components::{
    Component, DetailPanel, DetailPanelProps, DexList, DexListProps, SearchBar, SearchBarProps,
    StatusFooter, StatusFooterProps,
};
use pokedex::effect::Effect;
use pokedex::logging;
use pokedex::reducer::reducer;
use pokedex::sprite;
use pokedex::sprite_backend::{self, SpriteBackend};
use pokedex::state::AppState;

const TICK_MS: u64 = 120;
const LIST_WIDTH: u16 = 28;

/// Pokedex TUI - catalog, search and detail view over PokeAPI
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse the original 151 Pokemon")]
struct Args {
    /// Base URL of the PokeAPI v2 service
    #[arg(long, default_value = api::API_BASE)]
    api_base: String,

    /// Directory for the daily log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum DexComponentId {
    List,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum DexContext {
    List,
    Search,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            Some(DexComponentId::List)
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::List => DexContext::List,
            DexComponentId::Search => DexContext::Search,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::List
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        api_base,
        log_dir,
        debug: debug_args,
    } = Args::parse();

    let log_dir = log_dir.unwrap_or_else(logging::default_log_dir);
    let _log_guard = logging::init_logging(&log_dir)?;
    tracing::info!(%api_base, log_dir = %log_dir.display(), "starting pokedex");

    let debug = DebugSession::new(debug_args);

    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(api_base))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::sprite_slot());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("pokedex exited");
    Ok(())
}

struct DexUi {
    search: SearchBar,
    list: DexList,
    detail: DetailPanel,
    footer: StatusFooter,
}

impl DexUi {
    fn new() -> Self {
        Self {
            search: SearchBar::new(),
            list: DexList::new(),
            detail: DetailPanel,
            footer: StatusFooter::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);
        let body = Layout::horizontal([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
            .split(rows[1]);

        event_ctx.set_component_area(DexComponentId::Search, rows[0]);
        event_ctx.set_component_area(DexComponentId::List, body[0]);

        self.search.set_active(state.search.active);
        let search_props = SearchBarProps {
            query: &state.search.query,
            is_focused: render_ctx.is_focused() && state.search.active,
        };
        self.search.render(frame, rows[0], search_props);

        let visible = state.visible_entries();
        let list_props = DexListProps {
            entries: &visible,
            total: state.entries.len(),
            query: &state.search.query,
            cursor: state.cursor,
            is_focused: render_ctx.is_focused() && !state.search.active,
            is_loading: state.is_loading,
            selected_name: state.selected.as_ref().map(|record| record.name.as_str()),
        };
        self.list.render(frame, body[0], list_props);

        let detail_props = DetailPanelProps {
            record: state.selected.as_ref(),
            sprite: &state.sprite,
        };
        self.detail.render(frame, body[1], detail_props);

        let footer_props = StatusFooterProps {
            is_loading: state.is_loading,
            pending_name: state.pending_name.as_deref(),
            search_active: state.search.active,
            tick: state.tick,
        };
        self.footer.render(frame, rows[2], footer_props);
    }

    fn handle_list_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let visible = state.visible_entries();
        let props = DexListProps {
            entries: &visible,
            total: state.entries.len(),
            query: &state.search.query,
            cursor: state.cursor,
            is_focused: true,
            is_loading: state.is_loading,
            selected_name: state.selected.as_ref().map(|record| record.name.as_str()),
        };
        let actions: Vec<_> = self.list.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.search.set_active(state.search.active);
        let props = SearchBarProps {
            query: &state.search.query,
            is_focused: true,
        };
        let actions: Vec<_> = self.search.handle_event(event, props).into_iter().collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(DexComponentId::List, move |event, state| {
        ui_list
            .borrow_mut()
            .handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(DexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        EventKind::Key(key) if !state.search.active => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Char('/') => HandlerResponse::action(Action::SearchOpen),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Handle effects by spawning tasks. Every outcome comes back as an action.
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadCatalog { api_base } => {
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match api::fetch_catalog(&api_base).await {
                    Ok(entries) => Action::CatalogDidLoad(entries),
                    Err(err) => {
                        tracing::warn!(error = %err, "catalog fetch failed");
                        Action::CatalogDidError(err.to_string())
                    }
                }
            });
        }
        Effect::LoadDetail { generation, url } => {
            let key = format!("detail_{generation}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_detail(&url).await {
                    Ok(detail) => Action::DetailDidLoad { generation, detail },
                    Err(err) => {
                        tracing::warn!(error = %err, %url, "detail fetch failed");
                        Action::DetailDidError {
                            generation,
                            error: err.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadDescription {
            generation,
            api_base,
            detail,
        } => {
            let key = format!("description_{generation}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let name = detail.name.clone();
                match api::fetch_description(&api_base, detail).await {
                    Ok(record) => Action::DescriptionDidLoad { generation, record },
                    Err(err) => {
                        tracing::warn!(error = %err, %name, "description fetch failed");
                        Action::DescriptionDidError {
                            generation,
                            error: err.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadSprite { name, url } => {
            let key = format!("sprite_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let decoded = match api::fetch_bytes(&url).await {
                    Ok(bytes) => sprite::decode_sprite(&bytes),
                    Err(err) => Err(err.to_string()),
                };
                match decoded {
                    Ok(sprite) => Action::SpriteDidLoad { name, sprite },
                    Err(error) => {
                        tracing::warn!(%error, %name, "sprite load failed");
                        Action::SpriteDidError { name, error }
                    }
                }
            });
        }
    }
}
