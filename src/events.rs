// ionblade — Gesture Events & Effector Commands

use crate::config::*;

// ---------------------------------------------------------------------------
// Gesture event space
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Fast rotation of the blade — whoosh sound, no flash.
    Swing,
    /// Light impact — short clash sound, brief white flash.
    StrikeSoft,
    /// Heavy impact — long clash sound, stronger white flash.
    StrikeHard,
}

impl Gesture {
    /// Effect files are named `<prefix><variant>.wav` on the card.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Swing => "SWL",
            Self::StrikeSoft => "SKS",
            Self::StrikeHard => "SK",
        }
    }

    /// Inclusive range the variant index is drawn from — one entry per
    /// recorded sample of the family.
    pub fn variant_range(self) -> (u32, u32) {
        match self {
            Self::Swing => (1, 4),
            Self::StrikeSoft | Self::StrikeHard => (1, 8),
        }
    }

    /// Lockout duration for a 1-based variant, from the family's table.
    pub fn duration_ms(self, variant: u32) -> u32 {
        let idx = variant as usize - 1;
        match self {
            Self::Swing => SWING_TIME_MS[idx],
            Self::StrikeSoft => STRIKE_SOFT_TIME_MS[idx],
            Self::StrikeHard => STRIKE_HARD_TIME_MS[idx],
        }
    }

    /// Strikes accent the blade with a white flash; swings leave it alone.
    pub fn flash_hold_ms(self) -> Option<u32> {
        match self {
            Self::Swing => None,
            Self::StrikeSoft => Some(FLASH_SOFT_MS),
            Self::StrikeHard => Some(FLASH_HARD_MS),
        }
    }

    pub fn file_name(self, variant: u32) -> String {
        format!("{}{}.wav", self.file_prefix(), variant)
    }
}

// ---------------------------------------------------------------------------
// Effector commands — emitted by the controller, executed by the main loop
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop whatever is playing and start the named effect file.
    PlayEffect { name: String },
    /// Stop whatever is playing and start the idle hum run.
    PlayHum,
    /// Fill the blade white, hold, restore the active color. Blocks the
    /// whole control loop for the hold.
    FlashWhite { hold_ms: u32 },
    /// Re-render the blade with the given palette index.
    SetColor { index: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_files_follow_prefix_and_variant() {
        assert_eq!(Gesture::Swing.file_name(3), "SWL3.wav");
        assert_eq!(Gesture::StrikeSoft.file_name(1), "SKS1.wav");
        assert_eq!(Gesture::StrikeHard.file_name(8), "SK8.wav");
    }

    #[test]
    fn durations_come_from_the_family_table() {
        assert_eq!(Gesture::Swing.duration_ms(1), 486);
        assert_eq!(Gesture::Swing.duration_ms(4), 652);
        assert_eq!(Gesture::StrikeSoft.duration_ms(2), 267);
        assert_eq!(Gesture::StrikeHard.duration_ms(1), 879);
    }

    #[test]
    fn only_strikes_flash() {
        assert_eq!(Gesture::Swing.flash_hold_ms(), None);
        assert_eq!(Gesture::StrikeSoft.flash_hold_ms(), Some(50));
        assert_eq!(Gesture::StrikeHard.flash_hold_ms(), Some(100));
    }
}
