//! Named key layouts in the simple-keyboard row convention: each row is a
//! string of whitespace-separated identifiers, with `{name}` for function keys.

pub const DEFAULT_ROWS: [&str; 5] = [
    "` 1 2 3 4 5 6 7 8 9 0 - = {bksp}",
    "{tab} q w e r t y u i o p [ ] \\",
    "{lock} a s d f g h j k l ; ' {enter}",
    "{shift} z x c v b n m , . / {shift}",
    ".com @ {space}",
];

pub const SHIFT_ROWS: [&str; 5] = [
    "~ ! @ # $ % ^ & * ( ) _ + {bksp}",
    "{tab} Q W E R T Y U I O P { } |",
    "{lock} A S D F G H J K L : \" {enter}",
    "{shift} Z X C V B N M < > ? {shift}",
    ".com @ {space}",
];

/// Width of a key in key units.
pub fn key_width(identifier: &str) -> f32 {
    match identifier {
        "{bksp}" => 2.0,
        "{tab}" => 1.5,
        "{lock}" => 1.75,
        "{enter}" | "{shift}" => 2.25,
        "{space}" => 6.0,
        _ => 1.0,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layouts {
    named: Vec<(String, Vec<Vec<String>>)>,
}

impl Layouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// The US QWERTY pair, named "default" and "shift".
    pub fn qwerty() -> Self {
        Self::new()
            .with("default", &DEFAULT_ROWS)
            .with("shift", &SHIFT_ROWS)
    }

    /// Adds or replaces a layout. Blank rows are dropped.
    pub fn with(mut self, name: &str, rows: &[&str]) -> Self {
        let parsed: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        match self.named.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = parsed,
            None => self.named.push((name.to_string(), parsed)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[Vec<String>]> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.iter().map(|(n, _)| n.as_str())
    }
}
