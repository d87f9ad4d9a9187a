use types::Guardian;

/// Client coordinates where a menu opens.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    /// Just below the trigger's left edge, given the trigger's client rect.
    pub fn below(left: f64, top: f64, height: f64) -> Self {
        Self {
            x: left,
            y: top + height,
        }
    }
}

/// The guardian switcher dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Menu {
    #[default]
    Closed,
    Open {
        anchor: Anchor,
    },
}

impl Menu {
    pub fn is_open(&self) -> bool {
        matches!(self, Menu::Open { .. })
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            Menu::Open { anchor } => Some(*anchor),
            Menu::Closed => None,
        }
    }

    /// The trigger was activated.
    pub fn activate(&mut self, anchor: Anchor) {
        *self = Menu::Open { anchor };
    }

    /// Click outside the menu.
    pub fn dismiss(&mut self) {
        *self = Menu::Closed;
    }

    /// Keyboard input while the menu has focus. Escape closes it.
    pub fn key(&mut self, key: &str) {
        if key == "Escape" {
            self.dismiss();
        }
    }

    /// Close the menu and return the id of the guardian to navigate to.
    pub fn select(&mut self, guardian: &Guardian) -> String {
        *self = Menu::Closed;
        guardian.id.clone()
    }
}
