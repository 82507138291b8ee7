//! Key payloads as the ordered low-level strokes a keyboard injector sends.

use std::fmt;

use padboard_core::{KeyPayload, Phase};
use serde::Serialize;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KeyStroke {
    /// Set-1 scan code. `extended` keys carry the 0xE0 prefix.
    Scan { code: u8, extended: bool, up: bool },
    /// One UTF-16 code unit typed as text.
    Unicode { unit: u16, up: bool },
}

impl KeyStroke {
    pub fn scan(code: u16, up: bool) -> Self {
        KeyStroke::Scan {
            code: (code & 0xFF) as u8,
            extended: code & 0xFF00 == 0xE000,
            up,
        }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = |up: bool| if up { "up" } else { "down" };
        match *self {
            KeyStroke::Scan {
                code,
                extended: true,
                up,
            } => write!(f, "scan e0 {code:02x} {}", arrow(up)),
            KeyStroke::Scan { code, up, .. } => write!(f, "scan {code:02x} {}", arrow(up)),
            KeyStroke::Unicode { unit, up } => write!(f, "unicode U+{unit:04X} {}", arrow(up)),
        }
    }
}

pub type Strokes = SmallVec<[KeyStroke; 4]>;

pub fn scan_code(key: &str) -> Option<u16> {
    Some(match key {
        "{enter}" => 0x1C,
        "{bksp}" => 0x0E,
        "{space}" => 0x39,
        "{tab}" => 0x0F,
        "{esc}" => 0x01,
        "{shift}" => 0x2A,
        "{lock}" => 0x3A,
        "{arrowup}" => 0xE048,
        "{arrowdown}" => 0xE050,
        "{arrowleft}" => 0xE04B,
        "{arrowright}" => 0xE04D,
        _ => return None,
    })
}

pub fn modifier_code(name: &str) -> Option<u16> {
    Some(match name {
        "shift" => 0x2A,
        "ctrl" => 0x1D,
        "alt" => 0x38,
        "win" => 0xE05B,
        _ => return None,
    })
}

/// Modifiers go down before the key on `down` and come up after it, in
/// reverse, on `up`. Text is typed (down+up per unit) on `down` and
/// `repeat` only. An unknown symbolic key yields no key strokes.
pub fn strokes(payload: &KeyPayload) -> Strokes {
    let mut out = Strokes::new();
    let up = payload.phase == Phase::Up;
    let modifiers = || payload.modifiers.iter().filter_map(|m| modifier_code(m));

    if payload.phase == Phase::Down {
        out.extend(modifiers().map(|sc| KeyStroke::scan(sc, false)));
    }

    if let Some(key) = &payload.key {
        match scan_code(key) {
            Some(sc) => out.push(KeyStroke::scan(sc, up)),
            None => log::debug!("no scan code for {key}"),
        }
    } else if let Some(text) = &payload.text
        && !up
    {
        for unit in text.encode_utf16() {
            out.push(KeyStroke::Unicode { unit, up: false });
            out.push(KeyStroke::Unicode { unit, up: true });
        }
    }

    if up {
        let held: SmallVec<[u16; 4]> = modifiers().collect();
        out.extend(held.into_iter().rev().map(|sc| KeyStroke::scan(sc, true)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str, phase: Phase) -> KeyPayload {
        KeyPayload::for_identifier(id, phase)
    }

    #[test]
    fn symbolic_keys_use_scan_codes() {
        assert_eq!(
            strokes(&payload("{enter}", Phase::Down)).as_slice(),
            [KeyStroke::Scan {
                code: 0x1C,
                extended: false,
                up: false
            }]
        );
        assert_eq!(
            strokes(&payload("{arrowleft}", Phase::Up)).as_slice(),
            [KeyStroke::Scan {
                code: 0x4B,
                extended: true,
                up: true
            }]
        );
        assert!(strokes(&payload("{f13}", Phase::Down)).is_empty());
    }

    #[test]
    fn text_is_typed_per_utf16_unit() {
        let s = strokes(&payload("é", Phase::Repeat));
        assert_eq!(
            s.as_slice(),
            [
                KeyStroke::Unicode {
                    unit: 0xE9,
                    up: false
                },
                KeyStroke::Unicode { unit: 0xE9, up: true },
            ]
        );
        assert_eq!(strokes(&payload("😀", Phase::Down)).len(), 4);
        assert!(strokes(&payload("q", Phase::Up)).is_empty());
    }

    #[test]
    fn modifiers_wrap_the_key() {
        let down = payload("{tab}", Phase::Down)
            .with_modifier("ctrl")
            .with_modifier("win");
        let rendered: Vec<String> = strokes(&down).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["scan 1d down", "scan e0 5b down", "scan 0f down"]);

        let mut up = down.clone();
        up.phase = Phase::Up;
        let rendered: Vec<String> = strokes(&up).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["scan 0f up", "scan e0 5b up", "scan 1d up"]);

        let mut repeat = down;
        repeat.phase = Phase::Repeat;
        assert_eq!(strokes(&repeat).len(), 1);
    }

    #[test]
    fn json_shape() {
        let v = serde_json::to_value(KeyStroke::scan(0x39, true)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"kind": "scan", "code": 0x39, "extended": false, "up": true})
        );
    }
}
