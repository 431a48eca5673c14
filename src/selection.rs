use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::KeyCode;
use crate::lights::LIGHT_COLOUR_PRESETS;
use crate::shader::ShaderVariant;

/// What the user has picked to look at this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderSelection {
    pub variant: ShaderVariant,
    /// Drawable index to show on its own; `None` draws every object.
    pub object: Option<usize>,
    /// Index into [`LIGHT_COLOUR_PRESETS`].
    pub light_colour: usize,
}

/// Result of feeding a key to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Variant,
    Object,
    LightColour,
}

impl RenderSelection {
    pub fn new(variant: ShaderVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// F1-F5 pick the shader, 1-9 isolate an object, 0 shows all of them and
    /// L cycles the light colour.
    pub fn handle_key(&mut self, key: KeyCode, object_count: usize) -> Option<SelectionChange> {
        match key {
            KeyCode::Function(n @ 1..=5) => {
                self.variant = ShaderVariant::ALL[(n - 1) as usize];
                Some(SelectionChange::Variant)
            }
            KeyCode::Digit(0) => {
                self.object = None;
                Some(SelectionChange::Object)
            }
            KeyCode::Digit(n) if (n as usize) <= object_count => {
                self.object = Some(n as usize - 1);
                Some(SelectionChange::Object)
            }
            KeyCode::Character('L') => {
                self.light_colour = (self.light_colour + 1) % LIGHT_COLOUR_PRESETS.len();
                Some(SelectionChange::LightColour)
            }
            _ => None,
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.object.map_or(true, |selected| selected == index)
    }

    pub fn light_colour(&self) -> Vec3 {
        LIGHT_COLOUR_PRESETS[self.light_colour % LIGHT_COLOUR_PRESETS.len()]
    }
}
