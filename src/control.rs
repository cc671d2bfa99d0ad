// ionblade — Action-Timing State Machine
//
// All mutable runtime state lives here: the lockout window of the effect in
// progress, the hum flag, the blade color index, and the button debounce
// timestamp. One `cycle` call per control-loop pass turns a magnitude pair
// and a button read into effector commands; the hardware never reaches in.
//
// Timestamps are wrapping u32 milliseconds, so every elapsed-time comparison
// goes through `wrapping_sub`.

use crate::classifier::{self, Proposal};
use crate::config::*;
use crate::events::Command;
use crate::motion::Magnitudes;

// ---------------------------------------------------------------------------
// Action timer — the lockout window
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
pub struct ActionTimer {
    last_action_ms: u32,
    timeout_ms: u32,
}

impl ActionTimer {
    pub fn new() -> Self {
        Self { last_action_ms: 0, timeout_ms: 0 }
    }

    /// True while the most recent action's window has not yet passed.
    /// The window boundary itself still counts as locked.
    pub fn is_locked_out(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_action_ms) <= self.timeout_ms
    }

    /// Start a new window. Overwrites both fields; there is no partial state.
    pub fn arm(&mut self, now_ms: u32, duration_ms: u32) {
        self.last_action_ms = now_ms;
        self.timeout_ms = duration_ms;
    }
}

// ---------------------------------------------------------------------------
// Hum state
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
struct HumState {
    active: bool,
    started_ms: u32,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------
pub struct Controller {
    timer: ActionTimer,
    hum: HumState,
    color_index: u8,
    last_press_ms: u32,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            timer: ActionTimer::new(),
            hum: HumState { active: false, started_ms: 0 },
            color_index: 0,
            last_press_ms: 0,
        }
    }

    /// Palette index the blade currently shows — the restore target for a
    /// strike flash.
    pub fn color_index(&self) -> u8 {
        self.color_index
    }

    /// Run one control cycle. Commands come back in execution order.
    pub fn cycle(
        &mut self,
        now_ms: u32,
        mags: Magnitudes,
        button_pressed: bool,
        rng: &mut impl FnMut(u32, u32) -> u32,
    ) -> Vec<Command> {
        let mut commands = Vec::new();

        // The lockout gate is evaluated once, before any dispatch of this
        // cycle, so both families see the same answer.
        let mut dispatched = false;
        if !self.timer.is_locked_out(now_ms) {
            let events = classifier::classify(mags, rng);

            // Swing first, strike second: when both bands trip in the same
            // cycle the strike's window, hum clear, and audio supersede the
            // swing's.
            if let Some(proposal) = events.swing {
                self.dispatch(now_ms, proposal, &mut commands);
                dispatched = true;
            }
            if let Some(proposal) = events.strike {
                self.dispatch(now_ms, proposal, &mut commands);
                dispatched = true;
            }
        }

        if !dispatched {
            self.update_hum(now_ms, &mut commands);
        }

        // Color changes are always live, even mid-effect.
        self.update_color(now_ms, button_pressed, &mut commands);

        commands
    }

    fn dispatch(&mut self, now_ms: u32, proposal: Proposal, out: &mut Vec<Command>) {
        let Proposal { gesture, variant } = proposal;
        let duration_ms = gesture.duration_ms(variant);

        // Strikes flash before their sound starts, as the recordings expect.
        if let Some(hold_ms) = gesture.flash_hold_ms() {
            out.push(Command::FlashWhite { hold_ms });
        }
        out.push(Command::PlayEffect { name: gesture.file_name(variant) });

        self.timer.arm(now_ms, duration_ms);
        self.hum.active = false;

        log::info!("{:?} variant {} ({} ms lockout)", gesture, variant, duration_ms);
    }

    fn update_hum(&mut self, now_ms: u32, out: &mut Vec<Command>) {
        if !self.hum.active && !self.timer.is_locked_out(now_ms) {
            // Idle and quiet — start the ambient loop.
            out.push(Command::PlayHum);
            self.hum.active = true;
            self.hum.started_ms = now_ms;
            log::debug!("hum started");
        } else if self.hum.active
            && now_ms.wrapping_sub(self.hum.started_ms) > HUM_RETRIGGER_MS
        {
            // The queued repeats run out after a few seconds; re-issue the
            // play before they do.
            out.push(Command::PlayHum);
            self.hum.started_ms = now_ms;
        }
    }

    fn update_color(&mut self, now_ms: u32, pressed: bool, out: &mut Vec<Command>) {
        if pressed && now_ms.wrapping_sub(self.last_press_ms) > BUTTON_DEBOUNCE_MS {
            self.color_index = (self.color_index + 1) % BLADE_COLORS.len() as u8;
            out.push(Command::SetColor { index: self.color_index });
            self.last_press_ms = now_ms;
            log::info!("blade color -> {}", self.color_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Command;

    fn mags(acc: u16, gyr: u16) -> Magnitudes {
        Magnitudes { acc, gyr }
    }

    fn still() -> Magnitudes {
        mags(0, 0)
    }

    /// rng that always draws the given variant.
    fn fixed(variant: u32) -> impl FnMut(u32, u32) -> u32 {
        move |_, _| variant
    }

    // ---- ActionTimer ------------------------------------------------------

    #[test]
    fn timer_locks_through_the_window_boundary() {
        let mut timer = ActionTimer::new();
        timer.arm(1000, 500);
        assert!(timer.is_locked_out(1000));
        assert!(timer.is_locked_out(1400));
        assert!(timer.is_locked_out(1500)); // boundary still locked
        assert!(!timer.is_locked_out(1501));
    }

    #[test]
    fn timer_tolerates_clock_wraparound() {
        let mut timer = ActionTimer::new();
        timer.arm(u32::MAX - 100, 500);
        assert!(timer.is_locked_out(u32::MAX));
        assert!(timer.is_locked_out(300)); // 401 ms into the window, wrapped
        assert!(!timer.is_locked_out(500)); // 601 ms — expired
    }

    #[test]
    fn rearming_overwrites_the_previous_window() {
        let mut timer = ActionTimer::new();
        timer.arm(0, 10_000);
        timer.arm(100, 50);
        assert!(!timer.is_locked_out(151));
    }

    // ---- gesture dispatch -------------------------------------------------

    #[test]
    fn swing_dispatch_plays_effect_and_arms_lockout() {
        let mut ctl = Controller::new();
        let cmds = ctl.cycle(50, mags(0, 100), false, &mut fixed(2));
        assert_eq!(cmds, vec![Command::PlayEffect { name: "SWL2.wav".into() }]);

        // SWL2 lasts 541 ms: locked at 50+541, free one tick later.
        let during = ctl.cycle(50 + 541, mags(0, 250), false, &mut fixed(1));
        assert!(during.is_empty());
        let after = ctl.cycle(50 + 542, still(), false, &mut fixed(1));
        assert_eq!(after, vec![Command::PlayHum]);
    }

    #[test]
    fn soft_strike_flashes_then_plays() {
        let mut ctl = Controller::new();
        let cmds = ctl.cycle(10, mags(75, 0), false, &mut fixed(3));
        assert_eq!(
            cmds,
            vec![
                Command::FlashWhite { hold_ms: 50 },
                Command::PlayEffect { name: "SKS3.wav".into() },
            ]
        );
    }

    #[test]
    fn hard_strike_boundary_is_inclusive() {
        let mut ctl = Controller::new();
        let cmds = ctl.cycle(10, mags(150, 0), false, &mut fixed(1));
        assert_eq!(
            cmds,
            vec![
                Command::FlashWhite { hold_ms: 100 },
                Command::PlayEffect { name: "SK1.wav".into() },
            ]
        );
    }

    #[test]
    fn lockout_inhibits_every_gesture() {
        let mut ctl = Controller::new();
        ctl.cycle(50, mags(0, 100), false, &mut fixed(1)); // 486 ms window
        // Violent readings inside the window classify as nothing.
        let cmds = ctl.cycle(200, mags(500, 500), false, &mut fixed(1));
        assert!(cmds.is_empty());
    }

    #[test]
    fn strike_supersedes_swing_in_the_same_cycle() {
        let mut ctl = Controller::new();
        let cmds = ctl.cycle(10, mags(200, 100), false, &mut fixed(1));
        // Both dispatch, in order; the strike's state writes win.
        assert_eq!(
            cmds,
            vec![
                Command::PlayEffect { name: "SWL1.wav".into() },
                Command::FlashWhite { hold_ms: 100 },
                Command::PlayEffect { name: "SK1.wav".into() },
            ]
        );
        // SWL1 alone would free the timer at 10+487; SK1 holds 879 ms.
        assert!(ctl.cycle(10 + 600, still(), false, &mut fixed(1)).is_empty());
        let after = ctl.cycle(10 + 880, still(), false, &mut fixed(1));
        assert_eq!(after, vec![Command::PlayHum]);
    }

    // ---- hum --------------------------------------------------------------

    #[test]
    fn hum_starts_once_when_idle() {
        let mut ctl = Controller::new();
        let first = ctl.cycle(10, still(), false, &mut fixed(1));
        assert_eq!(first, vec![Command::PlayHum]);
        let second = ctl.cycle(20, still(), false, &mut fixed(1));
        assert!(second.is_empty());
    }

    #[test]
    fn hum_retriggers_strictly_after_the_keepalive_window() {
        let mut ctl = Controller::new();
        ctl.cycle(10, still(), false, &mut fixed(1)); // hum starts at 10
        assert!(ctl.cycle(5010, still(), false, &mut fixed(1)).is_empty());
        let cmds = ctl.cycle(5011, still(), false, &mut fixed(1));
        assert_eq!(cmds, vec![Command::PlayHum]);
        // The keep-alive refreshed its own timestamp.
        assert!(ctl.cycle(10_011, still(), false, &mut fixed(1)).is_empty());
        assert_eq!(
            ctl.cycle(10_012, still(), false, &mut fixed(1)),
            vec![Command::PlayHum]
        );
    }

    #[test]
    fn gesture_silences_hum_until_the_window_expires() {
        let mut ctl = Controller::new();
        ctl.cycle(10, still(), false, &mut fixed(1)); // humming
        ctl.cycle(20, mags(0, 100), false, &mut fixed(1)); // swing, 486 ms
        // Hum is off and stays off through the window — even past the
        // keep-alive horizon of the silenced run.
        assert!(ctl.cycle(400, still(), false, &mut fixed(1)).is_empty());
        // First idle cycle after expiry starts a fresh hum.
        let cmds = ctl.cycle(20 + 487, still(), false, &mut fixed(1));
        assert_eq!(cmds, vec![Command::PlayHum]);
    }

    // ---- color selector ---------------------------------------------------

    #[test]
    fn color_cycles_through_the_palette_and_wraps() {
        let mut ctl = Controller::new();
        let mut seen = Vec::new();
        for i in 0..5 {
            let now = 1000 + i * 1000;
            for cmd in ctl.cycle(now, still(), true, &mut fixed(1)) {
                if let Command::SetColor { index } = cmd {
                    seen.push(index);
                }
            }
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 0]);
    }

    #[test]
    fn bounced_press_is_ignored_without_refreshing_the_window() {
        let mut ctl = Controller::new();
        ctl.cycle(1000, still(), true, &mut fixed(1)); // accepted → index 1
        // 200 ms later: rejected.
        let rejected = ctl.cycle(1200, still(), true, &mut fixed(1));
        assert!(!rejected.contains(&Command::SetColor { index: 2 }));
        // 301 ms after the *accepted* press: accepted. Had the rejected press
        // refreshed the timestamp this would still be inside the window.
        let cmds = ctl.cycle(1301, still(), true, &mut fixed(1));
        assert!(cmds.contains(&Command::SetColor { index: 2 }));
    }

    #[test]
    fn color_changes_are_allowed_mid_effect() {
        let mut ctl = Controller::new();
        ctl.cycle(500, mags(0, 100), false, &mut fixed(1)); // locked for 486 ms
        let cmds = ctl.cycle(700, still(), true, &mut fixed(1));
        assert_eq!(cmds, vec![Command::SetColor { index: 1 }]);
        assert_eq!(ctl.color_index(), 1);
    }

    // ---- end to end -------------------------------------------------------

    #[test]
    fn swing_scenario_from_cold_start() {
        let mut ctl = Controller::new();

        // t=0: the boot window itself still counts as locked out.
        assert!(ctl.cycle(0, still(), false, &mut fixed(1)).is_empty());

        // t=10: idle — hum comes up.
        assert_eq!(
            ctl.cycle(10, still(), false, &mut fixed(3)),
            vec![Command::PlayHum]
        );

        // t=50: fast rotation → swing variant 3, hum preempted.
        let cmds = ctl.cycle(50, mags(0, 250), false, &mut fixed(3));
        assert_eq!(cmds, vec![Command::PlayEffect { name: "SWL3.wav".into() }]);

        // Inside the 622 ms window nothing classifies, whatever the motion.
        for now in [100, 300, 50 + 622] {
            assert!(ctl.cycle(now, mags(400, 400), false, &mut fixed(1)).is_empty());
        }

        // One tick past the window the prop is idle again.
        assert_eq!(
            ctl.cycle(50 + 623, still(), false, &mut fixed(1)),
            vec![Command::PlayHum]
        );
    }
}
