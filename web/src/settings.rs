use crate::utils::*;
use ascend_core::{GridSize, SessionConfig};
use serde::{Deserialize, Serialize};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// Starting sizes offered in the settings panel.
pub(crate) const GRID_SIZE_CHOICES: [GridSize; 3] = [3, 4, 5];

/// The offered size closest to `size`, so the panel never shows a size it can't start.
pub(crate) fn nearest_choice(size: GridSize) -> GridSize {
    GRID_SIZE_CHOICES
        .iter()
        .copied()
        .min_by_key(|choice| choice.abs_diff(size))
        .unwrap_or(SessionConfig::DEFAULT_GRID_SIZE)
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub starting_grid_size: GridSize,
}

impl Settings {
    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.starting_grid_size)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_grid_size: SessionConfig::DEFAULT_GRID_SIZE,
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "ascend:settings:v1";
}

#[derive(Properties, PartialEq)]
pub(crate) struct SettingsProps {
    pub selected: GridSize,
    pub on_new_game: Callback<GridSize>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let selected = use_state_eq(|| nearest_choice(props.selected));

    let onchange = {
        let selected = selected.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse::<GridSize>() {
                Ok(size) => selected.set(size),
                Err(err) => log::error!("bad grid size {:?}: {}", select.value(), err),
            }
        })
    };

    let onclick = {
        let selected = *selected;
        let on_new_game = props.on_new_game.clone();
        Callback::from(move |_: MouseEvent| on_new_game.emit(selected))
    };

    html! {
        <div class="settings">
            <label for="grid-size-select">{"Select Grid Size:"}</label>
            <select id="grid-size-select" {onchange}>
                {
                    for GRID_SIZE_CHOICES.iter().map(|&size| html! {
                        <option value={size.to_string()} selected={size == *selected}>
                            {format!("{size}x{size}")}
                        </option>
                    })
                }
            </select>
            <button {onclick}>{"New Game"}</button>
        </div>
    }
}
