use crate::settings::{GRID_SIZE_CHOICES, Settings, SettingsView};
use crate::timers::TimerHost;
use crate::utils::*;
use ascend_core as game;
use clap::Args;
use game::{GridSize, KeyValueScoreStore, Phase, Position};
use yew::prelude::*;

type BrowserSession = game::Session<KeyValueScoreStore<LocalStorageBackend>>;

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewCardState {
    FaceDown,
    Revealed(game::CardValue),
    Matched(game::CardValue),
    Wrong(game::CardValue),
}

impl ViewCardState {
    fn from_snapshot(snapshot: &game::Snapshot, position: Position) -> Self {
        let card = snapshot.cards[usize::from(position)];
        if snapshot.wrong_card == Some(position) {
            Self::Wrong(card.value)
        } else if card.is_matched {
            Self::Matched(card.value)
        } else if card.is_revealed {
            Self::Revealed(card.value)
        } else {
            Self::FaceDown
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Select(Position),
    Timer(game::TimerId),
    NewGame(GridSize),
    NextLevel,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    position: Position,
    state: ViewCardState,
    #[prop_or_default]
    locked: bool,
    callback: Callback<Position>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    use ViewCardState::*;

    let CardProps {
        position,
        state,
        locked,
        callback,
    } = props.clone();

    let mut class = classes!(
        "card",
        match state {
            FaceDown => classes!(),
            Revealed(_) => classes!("is-flipped"),
            Matched(_) => classes!("is-flipped", "is-matched"),
            Wrong(_) => classes!("is-flipped", "is-wrong"),
        }
    );
    if locked {
        class.push("locked");
    }
    let face = match state {
        FaceDown => None,
        Revealed(value) | Matched(value) | Wrong(value) => Some(value),
    };

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card {} clicked", position);
        callback.emit(position);
    });

    html! {
        <div class="card-container" {onclick}>
            <div {class}>
                <div class="card-face card-face-front">{face.map(|value| value.to_string()).unwrap_or_default()}</div>
                <div class="card-face card-face-back">{"?"}</div>
            </div>
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct ScoreboardProps {
    mistakes: u32,
    time: u32,
    best_score: Option<game::BestScore>,
}

#[function_component(Scoreboard)]
fn scoreboard_component(props: &ScoreboardProps) -> Html {
    html! {
        <div class="scoreboard">
            <p>{format!("Mistakes: {}", props.mistakes)}</p>
            <p>{format!("Time: {}", format_clock(props.time))}</p>
            if let Some(best) = props.best_score {
                <p>{format!("High Score: {} ({} mistakes)", format_clock(best.time), best.mistakes)}</p>
            }
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct RoundOverProps {
    time: u32,
    mistakes: u32,
    is_new_best_score: bool,
    on_next_level: Callback<MouseEvent>,
}

#[function_component(RoundOverDialog)]
fn round_over_component(props: &RoundOverProps) -> Html {
    html! {
        <Modal>
            <div class="modal-overlay">
                <dialog class="modal-content" open={true}>
                    <h2>{"Round Over!"}</h2>
                    <p>{format!("Your Time: {}", format_clock(props.time))}</p>
                    <p>{format!("Your Mistakes: {}", props.mistakes)}</p>
                    if props.is_new_best_score {
                        <p class="new-high-score">{"New High Score!"}</p>
                    }
                    <button onclick={props.on_next_level.clone()}>{"Next Level"}</button>
                </dialog>
            </div>
        </Modal>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Starting grid size, overrides the saved settings
    #[arg(long)]
    pub size: Option<GridSize>,
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: BrowserSession,
    settings: Settings,
    timers: TimerHost,
    forced_seed: Option<u64>,
}

impl GameView {
    fn next_seed(&self) -> u64 {
        match self.forced_seed {
            Some(seed) => seed.wrapping_add(u64::from(self.session.level())),
            None => js_random_seed(),
        }
    }

    fn sync_timers(&mut self, ctx: &Context<Self>) {
        let commands = self.session.take_timer_commands();
        if !commands.is_empty() {
            self.timers.apply(commands, &ctx.link().callback(Msg::Timer));
        }
    }

    fn select(&mut self, position: Position) -> bool {
        match self.session.select_card(position) {
            Ok(outcome) => {
                log::debug!("select {}: {:?}", position, outcome);
                outcome.has_update()
            }
            Err(err) => {
                log::error!("select {} rejected: {}", position, err);
                false
            }
        }
    }

    fn new_game(&mut self, grid_size: GridSize) -> bool {
        let settings = Settings {
            starting_grid_size: grid_size,
        };
        if self.settings != settings && GRID_SIZE_CHOICES.contains(&grid_size) {
            self.settings = settings;
            self.settings.local_save();
        }

        let seed = self.next_seed();
        log::debug!("new game {}x{} seed: {}", grid_size, grid_size, seed);
        match self.session.start_round(grid_size, seed) {
            Ok(()) => true,
            Err(err) => {
                log::error!("could not start round: {}", err);
                false
            }
        }
    }

    fn next_level(&mut self) -> bool {
        let seed = self.next_seed();
        match self.session.advance(seed) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("cannot advance: {}", err);
                false
            }
        }
    }

    fn view_board(&self, ctx: &Context<Self>, snapshot: &game::Snapshot) -> Html {
        let grid_size = snapshot.grid_size;
        let style = format!("grid-template-columns: repeat({}, 1fr)", grid_size);
        let playable = snapshot.phase == Phase::Active && !snapshot.locked;
        let callback = ctx.link().callback(Msg::Select);

        html! {
            <div class={classes!("board-grid", playable.then_some("playable"))} {style}>
                {
                    for (0..snapshot.cards.len()).filter_map(|index| Position::try_from(index).ok()).map(|position| {
                        let state = ViewCardState::from_snapshot(snapshot, position);
                        let key = snapshot.cards[usize::from(position)].id.slot;
                        html! {
                            <CardView key={key} {position} {state} locked={!playable} callback={callback.clone()}/>
                        }
                    })
                }
            </div>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let settings = Settings::local_or_default();
        // a size from the URL only applies to this page load, it is never saved
        let config = match props.size {
            Some(size) => game::SessionConfig::new(size),
            None => settings.session_config(),
        };

        let store = KeyValueScoreStore::new(LocalStorageBackend);
        let mut view = Self {
            session: game::Session::new(config, store),
            settings,
            timers: TimerHost::default(),
            forced_seed: props.seed,
        };

        let seed = view.next_seed();
        view.session.new_game(seed);
        view.sync_timers(ctx);
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Select(position) => self.select(position),
            Timer(id) => {
                self.timers.fired(id);
                self.session.on_timer(id)
            }
            NewGame(grid_size) => self.new_game(grid_size),
            NextLevel => self.next_level(),
        };

        self.sync_timers(ctx);
        updated
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let snapshot = self.session.snapshot();
        let on_new_game = ctx.link().callback(Msg::NewGame);
        let on_next_level = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Msg::NextLevel
        });

        html! {
            <div class="app-container">
                <h1>{"Open Numbers in Order"}</h1>
                <SettingsView selected={self.settings.starting_grid_size} {on_new_game}/>
                <Scoreboard
                    mistakes={snapshot.mistake_count}
                    time={snapshot.elapsed_seconds}
                    best_score={snapshot.best_score}
                />
                { self.view_board(ctx, &snapshot) }
                if snapshot.phase == Phase::RoundOver {
                    <RoundOverDialog
                        time={snapshot.elapsed_seconds}
                        mistakes={snapshot.mistake_count}
                        is_new_best_score={snapshot.is_new_best_score}
                        {on_next_level}
                    />
                }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{CardLayout, MemoryScoreStore, Session, SessionConfig};

    fn snapshot_after(positions: &[Position]) -> game::Snapshot {
        let mut session = Session::new(SessionConfig::new(2), MemoryScoreStore::default());
        session.start_round_with_layout(CardLayout::from_values(2, &[3, 1, 4, 2]).unwrap());
        for &position in positions {
            session.select_card(position).unwrap();
        }
        session.snapshot()
    }

    #[test]
    fn card_states_follow_snapshot() {
        let snapshot = snapshot_after(&[1]);

        assert_eq!(ViewCardState::from_snapshot(&snapshot, 0), ViewCardState::FaceDown);
        assert_eq!(ViewCardState::from_snapshot(&snapshot, 1), ViewCardState::Matched(1));
    }

    #[test]
    fn wrong_card_is_shown_face_up() {
        let snapshot = snapshot_after(&[1, 2]);

        assert_eq!(ViewCardState::from_snapshot(&snapshot, 2), ViewCardState::Wrong(4));
        assert_eq!(ViewCardState::from_snapshot(&snapshot, 1), ViewCardState::Matched(1));
    }

    #[test]
    fn stylesheet_covers_card_and_board_states() {
        let css = include_str!("../style.css");
        for selector in [
            ".card.is-flipped",
            ".card.is-matched",
            ".card.is-wrong",
            ".card.locked",
            ".playable",
            ".card-face-back",
        ] {
            assert!(css.contains(selector), "missing {selector}");
        }
    }
}
