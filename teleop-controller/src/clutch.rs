use crate::sample::ButtonState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClutchState {
    #[default]
    Disengaged,
    Engaged,
}

/// What a single update did to the clutch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClutchTransition {
    Unchanged,
    Engaged,
    Disengaged,
}

/// Toggles tracking on every rising edge of the clutch button
///
/// Holding or releasing the button never toggles.
#[derive(Debug, Clone, Default)]
pub struct ClutchStateMachine {
    state: ClutchState,
    button_was_pressed: bool,
}

impl ClutchStateMachine {
    pub fn new() -> ClutchStateMachine {
        ClutchStateMachine::default()
    }

    pub fn state(&self) -> ClutchState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state == ClutchState::Engaged
    }

    /// Raw clutch button value seen on the previous update
    pub fn button_was_pressed(&self) -> bool {
        self.button_was_pressed
    }

    pub fn update(&mut self, button: ButtonState) -> ClutchTransition {
        let pressed = button.is_pressed();
        let rising_edge = pressed && !self.button_was_pressed;
        self.button_was_pressed = pressed;
        if !rising_edge {
            return ClutchTransition::Unchanged;
        }
        match self.state {
            ClutchState::Disengaged => {
                self.state = ClutchState::Engaged;
                ClutchTransition::Engaged
            }
            ClutchState::Engaged => {
                self.state = ClutchState::Disengaged;
                ClutchTransition::Disengaged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ButtonState::*;

    #[test]
    fn starts_disengaged() {
        let clutch = ClutchStateMachine::new();
        assert_eq!(clutch.state(), ClutchState::Disengaged);
        assert!(!clutch.button_was_pressed());
    }

    #[test]
    fn toggles_only_on_rising_edges() {
        let mut clutch = ClutchStateMachine::new();
        let sequence = [Released, Pressed, Pressed, Released, Pressed];
        let transitions: Vec<_> = sequence.iter().map(|b| clutch.update(*b)).collect();
        assert_eq!(
            transitions,
            vec![
                ClutchTransition::Unchanged,
                ClutchTransition::Engaged,
                ClutchTransition::Unchanged,
                ClutchTransition::Unchanged,
                ClutchTransition::Disengaged,
            ]
        );
        assert!(!clutch.is_engaged());
    }

    #[test]
    fn touch_is_not_a_press() {
        let mut clutch = ClutchStateMachine::new();
        assert_eq!(clutch.update(Touched), ClutchTransition::Unchanged);
        assert_eq!(clutch.update(Pressed), ClutchTransition::Engaged);
        // touched counts as released for edge detection
        assert_eq!(clutch.update(Touched), ClutchTransition::Unchanged);
        assert_eq!(clutch.update(Pressed), ClutchTransition::Disengaged);
    }

    #[test]
    fn sustained_press_holds_state() {
        let mut clutch = ClutchStateMachine::new();
        clutch.update(Pressed);
        for _ in 0..10 {
            assert_eq!(clutch.update(Pressed), ClutchTransition::Unchanged);
        }
        assert!(clutch.is_engaged());
        assert!(clutch.button_was_pressed());
    }
}
