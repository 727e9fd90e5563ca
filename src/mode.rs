// Masking modes. Disappear lets holes fade out after the deletion lag; Photo keeps them forever.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Disappear,
    Photo,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Disappear => Mode::Photo,
            Mode::Photo => Mode::Disappear,
        }
    }

    /// Text shown on the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Disappear => "Disappear Mode",
            Mode::Photo => "Photo Mode",
        }
    }

    /// Whether samples older than the deletion lag drop out of the visible set.
    pub fn expires_samples(self) -> bool {
        self == Mode::Disappear
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_returns_to_start() {
        assert_eq!(Mode::Disappear.toggled(), Mode::Photo);
        assert_eq!(Mode::Disappear.toggled().toggled(), Mode::Disappear);
    }

    #[test]
    fn labels_match_button_text() {
        assert_eq!(Mode::Disappear.to_string(), "Disappear Mode");
        assert_eq!(Mode::Photo.label(), "Photo Mode");
    }

    #[test]
    fn mode_names_in_config_are_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            mode: Mode,
        }
        let w: Wrap = toml::from_str("mode = \"photo\"").unwrap();
        assert_eq!(w.mode, Mode::Photo);
    }
}
