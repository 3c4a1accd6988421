//! Page-side JavaScript injected through `Runtime.evaluate`.
//!
//! Every snippet is a function literal applied to a JSON argument, so no
//! caller-supplied text is ever spliced into script source.

use serde::Serialize;
use serde_json::{json, Value};
use tourguide_protocols::{LauncherModel, PopupModel, Rect, Utterance};

/// Name of the `Runtime.addBinding` callback page controls invoke.
pub const BINDING: &str = "__tourguide";

/// Shared helpers: lazily build the overlay frame and popup card once per
/// document and cache their nodes on `window.__tourguideUi`.
const PRELUDE: &str = r#"
function ensureUi(binding) {
  if (window.__tourguideUi && document.body.contains(window.__tourguideUi.popup)) {
    return window.__tourguideUi;
  }
  const send = (cmd) => { const cb = window[binding]; if (typeof cb === 'function') cb(cmd); };
  const overlay = document.createElement('div');
  overlay.id = 'tourguide-highlight';
  overlay.style.cssText = 'position:absolute;display:none;pointer-events:none;z-index:2147483645;'
    + 'border:3px solid #4f8cff;border-radius:6px;box-shadow:0 0 0 9999px rgba(0,0,0,0.35);'
    + 'transition:all .3s ease;';
  const popup = document.createElement('div');
  popup.id = 'tourguide-popup';
  popup.style.cssText = 'position:fixed;display:none;right:24px;bottom:88px;max-width:360px;'
    + 'z-index:2147483647;background:#fff;color:#222;padding:16px;border-radius:8px;'
    + 'box-shadow:0 4px 24px rgba(0,0,0,.25);font:14px/1.5 sans-serif;';
  const content = document.createElement('div');
  const bar = document.createElement('div');
  bar.style.cssText = 'display:flex;gap:8px;align-items:center;margin-top:12px;';
  const counter = document.createElement('span');
  counter.style.flex = '1';
  const button = (label, cmd) => {
    const b = document.createElement('button');
    b.textContent = label;
    b.addEventListener('click', (e) => { e.stopPropagation(); send(cmd); });
    return b;
  };
  const mute = button('\u{1F50A}', 'mute');
  const prev = button('Prev', 'prev');
  const next = button('Next', 'next');
  const close = button('×', 'close');
  bar.append(counter, mute, prev, next, close);
  popup.append(content, bar);
  document.body.append(overlay, popup);
  if ('speechSynthesis' in window) {
    speechSynthesis.addEventListener('voiceschanged', () => send('voices-changed'));
  }
  window.__tourguideUi = { overlay, popup, content, counter, mute, prev, next, send, menu: null };
  return window.__tourguideUi;
}
"#;

/// Apply `body` (a JS function literal taking one argument) to `arg`.
pub fn invoke(body: &str, arg: &impl Serialize) -> String {
    let arg = serde_json::to_string(arg).unwrap_or_else(|_| "null".to_string());
    format!("(function() {{ {PRELUDE} return ({body})({arg}); }})()")
}

pub fn frame_overlay(rect: Rect) -> String {
    invoke(
        r#"function(a) {
  const ui = ensureUi(a.binding);
  const s = ui.overlay.style;
  s.left = a.rect.x + 'px';
  s.top = a.rect.y + 'px';
  s.width = a.rect.width + 'px';
  s.height = a.rect.height + 'px';
  s.display = 'block';
}"#,
        &json!({"binding": BINDING, "rect": rect}),
    )
}

pub fn hide_overlay() -> String {
    invoke(
        "function(a) { ensureUi(a.binding).overlay.style.display = 'none'; }",
        &json!({"binding": BINDING}),
    )
}

pub fn show_popup(model: &PopupModel) -> String {
    invoke(
        r#"function(a) {
  const ui = ensureUi(a.binding);
  ui.content.textContent = a.model.content;
  ui.counter.textContent = a.model.counter;
  ui.prev.disabled = !a.model.prev_enabled;
  ui.next.textContent = a.model.next_label;
  ui.popup.style.display = 'block';
}"#,
        &json!({"binding": BINDING, "model": model}),
    )
}

pub fn hide_popup() -> String {
    invoke(
        "function(a) { ensureUi(a.binding).popup.style.display = 'none'; }",
        &json!({"binding": BINDING}),
    )
}

pub fn set_mute_glyph(glyph: &str) -> String {
    invoke(
        "function(a) { ensureUi(a.binding).mute.textContent = a.glyph; }",
        &json!({"binding": BINDING, "glyph": glyph}),
    )
}

/// Deferred so the evaluate call returns before the dialog blocks the page.
pub fn alert(message: &str) -> String {
    invoke(
        "function(msg) { setTimeout(() => window.alert(msg), 0); }",
        &message,
    )
}

pub fn mount_launcher(model: &LauncherModel) -> String {
    let options: Vec<Value> = model
        .options
        .iter()
        .map(|(mode, label)| json!({"command": format!("start:{}", mode.as_str()), "label": label}))
        .collect();

    invoke(
        r#"function(a) {
  const ui = ensureUi(a.binding);
  if (document.getElementById('tourguide-launcher')) return false;
  const launcher = document.createElement('button');
  launcher.id = 'tourguide-launcher';
  launcher.textContent = a.title;
  launcher.style.cssText = 'position:fixed;right:24px;bottom:24px;z-index:2147483646;'
    + 'padding:10px 16px;border:none;border-radius:20px;background:#4f8cff;color:#fff;'
    + 'font:14px sans-serif;cursor:pointer;';
  launcher.addEventListener('click', (e) => { e.stopPropagation(); ui.send('menu'); });
  const menu = document.createElement('div');
  menu.id = 'tourguide-menu';
  menu.style.cssText = 'position:fixed;display:none;right:24px;bottom:72px;z-index:2147483646;'
    + 'background:#fff;border-radius:8px;box-shadow:0 4px 16px rgba(0,0,0,.2);';
  for (const option of a.options) {
    const item = document.createElement('button');
    item.textContent = option.label;
    item.style.cssText = 'display:block;width:100%;padding:8px 16px;border:none;background:none;'
      + 'text-align:left;cursor:pointer;';
    item.addEventListener('click', (e) => { e.stopPropagation(); ui.send(option.command); });
    menu.append(item);
  }
  document.addEventListener('click', (e) => {
    if (menu.style.display !== 'none' && !menu.contains(e.target) && e.target !== launcher) {
      ui.send('dismiss');
    }
  });
  document.body.append(launcher, menu);
  ui.menu = menu;
  return true;
}"#,
        &json!({"binding": BINDING, "title": model.title, "options": options}),
    )
}

pub fn set_menu_open(open: bool) -> String {
    invoke(
        r#"function(a) {
  const ui = ensureUi(a.binding);
  const menu = ui.menu || document.getElementById('tourguide-menu');
  if (menu) menu.style.display = a.open ? 'block' : 'none';
}"#,
        &json!({"binding": BINDING, "open": open}),
    )
}

pub const SPEECH_AVAILABLE: &str = "'speechSynthesis' in window";

pub const LIST_VOICES: &str = "('speechSynthesis' in window) \
    ? speechSynthesis.getVoices().map(v => ({ name: v.name, lang: v.lang })) : []";

pub const CANCEL_SPEECH: &str = "('speechSynthesis' in window) && speechSynthesis.cancel()";

pub fn speak(utterance: &Utterance) -> String {
    invoke(
        r#"function(u) {
  if (!('speechSynthesis' in window)) return false;
  const x = new SpeechSynthesisUtterance(u.text);
  x.rate = u.rate;
  x.pitch = u.pitch;
  if (u.voice) {
    const v = speechSynthesis.getVoices().find(v => v.name === u.voice.name && v.lang === u.voice.lang);
    if (v) { x.voice = v; x.lang = v.lang; }
  }
  speechSynthesis.speak(x);
  return true;
}"#,
        utterance,
    )
}

pub const SCROLL_OFFSET: &str = "[window.scrollX, window.scrollY]";

pub const SCROLL_INTO_VIEW: &str =
    "function() { this.scrollIntoView({ behavior: 'smooth', block: 'center' }); }";

pub const BOUNDING_RECT: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    return { x: r.left, y: r.top, width: r.width, height: r.height }; }";

pub const CLICK: &str = "function() { this.click(); }";

pub fn navigate(href: &str) -> String {
    invoke("function(href) { window.location.href = href; }", &href)
}

pub fn storage_get(key: &str) -> String {
    invoke("function(k) { return window.localStorage.getItem(k); }", &key)
}

pub fn storage_set(key: &str, value: &str) -> String {
    invoke(
        "function(a) { window.localStorage.setItem(a.key, a.value); }",
        &json!({"key": key, "value": value}),
    )
}

pub fn storage_remove(key: &str) -> String {
    invoke("function(k) { window.localStorage.removeItem(k); }", &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourguide_protocols::PlaybackMode;

    #[test]
    fn test_invoke_escapes_argument() {
        let js = alert("It's \"quoted\" </script>");
        assert!(js.contains(r#""It's \"quoted\" </script>""#));
        assert!(js.starts_with("(function()"));
    }

    #[test]
    fn test_invoke_embeds_prelude() {
        let js = hide_popup();
        assert!(js.contains("function ensureUi(binding)"));
        assert!(js.contains(BINDING));
    }

    #[test]
    fn test_launcher_options_become_commands() {
        let model = LauncherModel {
            title: "Start Project Tour".to_string(),
            options: vec![
                (PlaybackMode::Full, "Start full tour".to_string()),
                (PlaybackMode::Page, "Explain this page".to_string()),
            ],
        };
        let js = mount_launcher(&model);
        assert!(js.contains(r#""command":"start:full""#));
        assert!(js.contains(r#""command":"start:page""#));
        assert!(js.contains("Explain this page"));
    }

    #[test]
    fn test_popup_model_serialized() {
        let model = PopupModel {
            content: "Welcome".to_string(),
            counter: "1 / 3".to_string(),
            prev_enabled: false,
            next_label: "Next".to_string(),
        };
        let js = show_popup(&model);
        assert!(js.contains(r#""prev_enabled":false"#));
        assert!(js.contains(r#""counter":"1 / 3""#));
    }

    #[test]
    fn test_storage_set_passes_key_and_value() {
        let js = storage_set("tourguide-step", "2");
        assert!(js.contains(r#""key":"tourguide-step""#));
        assert!(js.contains(r#""value":"2""#));
    }
}
