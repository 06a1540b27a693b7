//! Settings panel injected into the host's extension settings area.

use flurry_engine::api::settings::{
    SliderRange, COLOR_ID, CONTAINER_ID, COUNT_ID, COUNT_RANGE, ENABLED_ID, PANEL_ID, SIZE_ID,
    SIZE_RANGE, SPEED_ID, SPEED_RANGE, TYPE_ID,
};
use flurry_engine::{AmbientConfig, ContainerLocator, EffectKind, SettingUpdate};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlInputElement, HtmlSelectElement};

use crate::runner::with_app;

fn kind_label(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::Snow => "❄️ Soft snow",
        EffectKind::Star => "✨ Twinkling stars",
        EffectKind::Leaf => "🍃 Falling leaves",
        EffectKind::Flower => "💐 Drifting petals",
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn slider_row(label: &str, id: &str, range: SliderRange, value: f32) -> String {
    format!(
        r#"<div class="ambient-control-row">
    <label for="{id}">{label}</label>
    <input type="range" id="{id}" min="{min}" max="{max}" step="{step}" value="{value}">
</div>"#,
        min = range.min,
        max = range.max,
        step = range.step,
    )
}

/// Panel markup, pre-filled from `config`.
pub fn panel_html(config: &AmbientConfig) -> String {
    let options: String = EffectKind::ALL
        .iter()
        .map(|&kind| {
            let selected = if kind == config.kind { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                kind.as_str(),
                selected,
                kind_label(kind)
            )
        })
        .collect();
    let checked = if config.enabled { " checked" } else { "" };

    format!(
        r#"<div id="{PANEL_ID}" class="inline-drawer">
<div class="inline-drawer-toggle inline-drawer-header">
    <b>Ambient Effects ✨</b>
    <div class="inline-drawer-icon fa-solid fa-circle-chevron-down"></div>
</div>
<div class="inline-drawer-content ambient-settings-box">
<div class="ambient-desc">Customize the background ambiance</div>
<div class="ambient-control-row">
    <label for="{ENABLED_ID}">Enable effect</label>
    <input type="checkbox" id="{ENABLED_ID}"{checked}>
</div>
<div class="ambient-control-row">
    <label for="{TYPE_ID}">Effect type</label>
    <select id="{TYPE_ID}">{options}</select>
</div>
<div class="ambient-control-row">
    <label for="{COLOR_ID}">Color</label>
    <input type="color" id="{COLOR_ID}" value="{color}">
</div>
{size}
{speed}
{count}
</div>
</div>"#,
        color = escape_attr(&config.color),
        size = slider_row("Particle size", SIZE_ID, SIZE_RANGE, config.size),
        speed = slider_row("Fall speed", SPEED_ID, SPEED_RANGE, config.speed),
        count = slider_row("Density", COUNT_ID, COUNT_RANGE, config.count as f32),
    )
}

/// Raw value of a control: `checked` for checkboxes, `value` otherwise.
fn control_value(document: &Document, id: &str) -> Option<String> {
    let el = document.get_element_by_id(id)?;
    let el = match el.dyn_into::<HtmlInputElement>() {
        Ok(input) if input.type_() == "checkbox" => return Some(input.checked().to_string()),
        Ok(input) => return Some(input.value()),
        Err(el) => el,
    };
    el.dyn_into::<HtmlSelectElement>().ok().map(|s| s.value())
}

fn set_color_picker(document: &Document, color: &str) {
    if let Some(input) = document
        .get_element_by_id(COLOR_ID)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        input.set_value(color);
    }
}

/// Control id and the DOM event that commits its value.
const BINDINGS: &[(&str, &str)] = &[
    (ENABLED_ID, "change"),
    (TYPE_ID, "change"),
    (COLOR_ID, "input"),
    (SIZE_ID, "input"),
    (SPEED_ID, "input"),
    (COUNT_ID, "input"),
];

fn on_control_change(document: &Document, id: &str) {
    let Some(raw) = control_value(document, id) else {
        return;
    };
    let Some(update) = SettingUpdate::from_control(id, &raw) else {
        log::debug!("ignoring {} = {:?}", id, raw);
        return;
    };
    let outcome = with_app(|app| app.runner.apply_setting(update));
    if let Some(color) = outcome.and_then(|o| o.suggested_color) {
        set_color_picker(document, &color);
    }
}

type Listener = Closure<dyn FnMut(Event)>;

fn listen(target: &Element, event: &str, handler: impl FnMut(Event) + 'static) -> Option<Listener> {
    let closure = Listener::new(handler);
    if let Err(err) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("could not bind {} listener: {:?}", event, err);
        return None;
    }
    Some(closure)
}

/// Attach the drawer toggle and every control handler. The returned closures
/// must outlive the panel element.
fn bind_controls(document: &Document, panel: &Element) -> Vec<Listener> {
    let mut listeners = Vec::with_capacity(BINDINGS.len() + 1);
    if let Ok(Some(header)) = panel.query_selector(".inline-drawer-toggle") {
        let drawer = panel.clone();
        listeners.extend(listen(&header, "click", move |_| {
            if let Err(err) = drawer.class_list().toggle("expanded") {
                log::debug!("drawer toggle failed: {:?}", err);
            }
        }));
    }

    for &(id, event) in BINDINGS {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("settings control #{} missing", id);
            continue;
        };
        let doc = document.clone();
        listeners.extend(listen(&el, event, move |_| on_control_change(&doc, id)));
    }
    listeners
}

/// Finds `#extensions_settings` and injects the panel, keyed on its id.
///
/// Owns the handlers of the current panel. A host re-render removes the
/// panel, so the old handlers are released on the next injection.
pub struct DomLocator {
    document: Document,
    listeners: Vec<Listener>,
}

impl DomLocator {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: Vec::new(),
        }
    }
}

impl ContainerLocator for DomLocator {
    type Container = Element;

    fn locate(&mut self) -> Option<Element> {
        self.document.get_element_by_id(CONTAINER_ID)
    }

    fn inject_once(&mut self, container: &Element) -> bool {
        if self.document.get_element_by_id(PANEL_ID).is_some() {
            return false;
        }
        let Some(config) = with_app(|app| app.runner.config().clone()) else {
            return false;
        };
        if let Err(err) = container.insert_adjacent_html("beforeend", &panel_html(&config)) {
            log::warn!("settings panel injection failed: {:?}", err);
            return false;
        }
        let Some(panel) = self.document.get_element_by_id(PANEL_ID) else {
            return false;
        };
        let released = std::mem::replace(&mut self.listeners, bind_controls(&self.document, &panel));
        log::debug!("settings panel injected, released {} stale handlers", released.len());
        true
    }
}
