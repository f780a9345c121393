use std::rc::Rc;

use dioxus::prelude::*;

use crate::core::dimensions::DimensionId;
use crate::core::slider::{keyboard_step, PointerCapture, TrackDrag, TrackGeometry};

use super::CardRow;

async fn measure(mounted: Option<Rc<MountedData>>) -> Option<TrackGeometry> {
    let rect = mounted?.get_client_rect().await.ok()?;
    Some(TrackGeometry::new(rect.origin.x, rect.size.width))
}

/// Draggable track for one dimension.
///
/// Pointer-down anywhere on the track starts a drag; the page root forwards moves and
/// releases through the shared [`PointerCapture`].
#[component]
pub fn SliderTrack(row: CardRow, on_change: EventHandler<(DimensionId, u8)>) -> Element {
    let capture = use_context::<PointerCapture>();
    let drag = use_hook(TrackDrag::new);
    let mut mounted = use_signal(|| Option::<Rc<MountedData>>::None);
    let mut geometry = use_signal(|| Option::<TrackGeometry>::None);

    use_drop({
        let drag = drag.clone();
        move || drag.end()
    });

    let dimension = row.dimension;
    let start = {
        let drag = drag.clone();
        move |track: TrackGeometry, client_x: f64| {
            drag.begin(&capture, track, client_x, move |percent| {
                on_change.call((dimension, percent));
            });
        }
    };

    let on_pointer_down = {
        let drag = drag.clone();
        move |evt: PointerEvent| {
            evt.prevent_default();
            let client_x = evt.client_coordinates().x;
            let cached = geometry();
            if let Some(track) = cached {
                start(track, client_x);
            }
            // Layout can shift between drags (scrolling, resizing); re-anchor to a fresh
            // measurement as soon as it lands.
            let start = start.clone();
            let drag = drag.clone();
            spawn(async move {
                let Some(track) = measure(mounted()).await else {
                    return;
                };
                geometry.set(Some(track));
                match cached {
                    None => start(track, client_x),
                    Some(previous) if previous != track => {
                        drag.remeasure(track);
                    }
                    Some(_) => {}
                }
            });
        }
    };

    let fill = row.fill;
    let on_key_down = move |evt: KeyboardEvent| {
        if let Some(next) = keyboard_step(&evt.key().to_string(), fill) {
            evt.prevent_default();
            on_change.call((dimension, next));
        }
    };

    let fill_class = if fill >= 99 {
        "vibe-track__fill vibe-track__fill--full"
    } else {
        "vibe-track__fill"
    };
    let aria_label = row.label;

    rsx! {
        div {
            class: "vibe-track",
            role: "slider",
            tabindex: 0,
            aria_label: "{aria_label}",
            aria_valuemin: "0",
            aria_valuemax: "100",
            aria_valuenow: "{fill}",
            onmounted: move |evt| {
                mounted.set(Some(evt.data()));
                spawn(async move {
                    if let Some(track) = measure(mounted()).await {
                        geometry.set(Some(track));
                    }
                });
            },
            onpointerdown: on_pointer_down,
            onkeydown: on_key_down,

            div { class: "vibe-track__base" }
            div { class: fill_class, style: "width: {fill}%;" }
            if let Some(proposed) = row.proposed {
                div { class: "vibe-track__proposed", style: "left: {proposed}%;" }
            }
            div { class: "vibe-track__handle", style: "left: {fill}%;" }
        }
    }
}
