use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use latexocr_types::HotkeyError;

/// Parse a chord such as `<ctrl>+<shift>+a`.
///
/// Angle brackets are optional and matching is case-insensitive. Exactly one
/// non-modifier key is required.
pub fn parse_chord(chord: &str) -> Result<HotKey, HotkeyError> {
    let parts: Vec<String> = chord
        .split('+')
        .map(|p| {
            p.trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .trim()
                .to_ascii_lowercase()
        })
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(HotkeyError::Empty);
    }

    let mut modifiers = Modifiers::empty();
    let mut code: Option<Code> = None;

    for part in &parts {
        match part.as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "shift" => modifiers |= Modifiers::SHIFT,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "cmd" | "command" | "super" | "win" | "meta" => modifiers |= Modifiers::SUPER,
            key => {
                if code.is_some() {
                    return Err(HotkeyError::MissingKey(chord.to_string()));
                }
                code = Some(key_code(key).ok_or_else(|| HotkeyError::UnknownKey(key.to_string()))?);
            }
        }
    }

    let code = code.ok_or_else(|| HotkeyError::MissingKey(chord.to_string()))?;
    let modifiers = (!modifiers.is_empty()).then_some(modifiers);
    Ok(HotKey::new(modifiers, code))
}

fn key_code(key: &str) -> Option<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "esc" | "escape" => Code::Escape,
        _ => return None,
    };
    Some(code)
}

/// Owns the single registered capture chord.
///
/// Must live on the thread that runs the platform event loop.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: Option<HotKey>,
    active_id: Arc<AtomicU32>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self, HotkeyError> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyError::Register(e.to_string()))?;
        Ok(Self {
            manager,
            hotkey: None,
            active_id: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Unregister the current chord, then register `chord`.
    ///
    /// On failure nothing stays registered.
    pub fn rebind(&mut self, chord: &str) -> Result<(), HotkeyError> {
        let hotkey = parse_chord(chord)?;

        if let Some(previous) = self.hotkey.take() {
            if let Err(e) = self.manager.unregister(previous) {
                tracing::warn!("Failed to unregister previous hotkey: {}", e);
            }
            self.active_id.store(0, Ordering::SeqCst);
        }

        self.manager
            .register(hotkey)
            .map_err(|e| HotkeyError::Register(e.to_string()))?;
        self.active_id.store(hotkey.id(), Ordering::SeqCst);
        self.hotkey = Some(hotkey);

        tracing::info!("Registered capture hotkey {}", chord);
        Ok(())
    }

    /// Shared id of the registered chord, 0 while none is registered
    pub fn active_id(&self) -> Arc<AtomicU32> {
        self.active_id.clone()
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        if let Some(hotkey) = self.hotkey.take() {
            let _ = self.manager.unregister(hotkey);
        }
    }
}

/// Block on global hotkey events and call `on_press` for presses of the
/// active chord. Returns when the event channel closes or `on_press`
/// returns false.
pub fn forward_presses(active_id: Arc<AtomicU32>, mut on_press: impl FnMut() -> bool) {
    let receiver = GlobalHotKeyEvent::receiver();
    while let Ok(event) = receiver.recv() {
        if event.state() != HotKeyState::Pressed {
            continue;
        }
        let active = active_id.load(Ordering::SeqCst);
        if active == 0 || event.id() != active {
            tracing::debug!("Ignoring hotkey event {}", event.id());
            continue;
        }
        if !on_press() {
            break;
        }
    }
}
