use bounded_integer::BoundedU8;

pub type Balls = BoundedU8<0, 3>;
pub type Strikes = BoundedU8<0, 2>;

const IN_PLAY_MARKER: &str = "In play";

/// What a pitch did to the count. Gameday only codes `B`, `S` and `X`, so fouls
/// are told apart from other strikes by their description.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum PitchCall {
    Ball,
    Strike,
    Foul,
    InPlay,
    Other,
}

impl PitchCall {
    pub fn classify(type_code: &str, description: &str) -> Self {
        match type_code {
            "B" => Self::Ball,
            "S" if is_foul(description) => Self::Foul,
            "S" => Self::Strike,
            "X" => Self::InPlay,
            _ => Self::Other,
        }
    }
}

// A foul tip caught by the catcher is a strike regardless of count
fn is_foul(description: &str) -> bool {
    description.starts_with("Foul") && !description.starts_with("Foul Tip")
}

pub fn is_hit(description: &str) -> bool {
    description.contains(IN_PLAY_MARKER)
}

/// Balls and strikes within a single plate appearance.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Count {
    pub balls: Balls,
    pub strikes: Strikes,
}

impl Default for Count {
    fn default() -> Self {
        Self {
            balls: Balls::MIN,
            strikes: Strikes::MIN,
        }
    }
}

impl Count {
    /// The count once `call` has been thrown. Ball four and strike three end the
    /// plate appearance, so the count itself tops out at 3-2.
    #[must_use]
    pub fn after(self, call: PitchCall) -> Self {
        match call {
            PitchCall::Ball => Self {
                balls: self.balls.saturating_add(1),
                ..self
            },
            PitchCall::Strike => Self {
                strikes: self.strikes.saturating_add(1),
                ..self
            },
            PitchCall::Foul if self.strikes < Strikes::MAX => Self {
                strikes: self.strikes.saturating_add(1),
                ..self
            },
            PitchCall::Foul | PitchCall::InPlay | PitchCall::Other => self,
        }
    }

    pub fn balls(self) -> u8 {
        self.balls.get()
    }

    pub fn strikes(self) -> u8 {
        self.strikes.get()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn count_of(calls: &[PitchCall]) -> (u8, u8) {
        let count = calls.iter().fold(Count::default(), |c, call| c.after(*call));
        (count.balls(), count.strikes())
    }

    #[rstest]
    #[case("B", "Ball", PitchCall::Ball)]
    #[case("B", "Ball In Dirt", PitchCall::Ball)]
    #[case("S", "Called Strike", PitchCall::Strike)]
    #[case("S", "Swinging Strike (Blocked)", PitchCall::Strike)]
    #[case("S", "Foul", PitchCall::Foul)]
    #[case("S", "Foul (Runner Going)", PitchCall::Foul)]
    #[case("S", "Foul Bunt", PitchCall::Foul)]
    #[case("S", "Foul Tip", PitchCall::Strike)]
    #[case("X", "In play, out(s)", PitchCall::InPlay)]
    #[case("", "Automatic Ball", PitchCall::Other)]
    fn classifies_calls(#[case] code: &str, #[case] des: &str, #[case] expected: PitchCall) {
        assert_eq!(PitchCall::classify(code, des), expected);
    }

    #[rstest]
    #[case("In play, run(s)", true)]
    #[case("In play, no out", true)]
    #[case("Called Strike", false)]
    #[case("in play, no out", false)]
    #[case("Hit By Pitch", false)]
    fn in_play_is_case_sensitive(#[case] des: &str, #[case] expected: bool) {
        assert_eq!(is_hit(des), expected);
    }

    #[test]
    fn fouls_stop_at_two_strikes() {
        use PitchCall::{Ball, Foul, Strike};
        assert_eq!(count_of(&[Foul, Foul, Foul, Foul]), (0, 2));
        assert_eq!(count_of(&[Ball, Strike, Foul, Ball, Foul]), (2, 2));
    }

    #[test]
    fn count_caps_at_full() {
        use PitchCall::{Ball, InPlay, Strike};
        assert_eq!(count_of(&[Ball, Ball, Ball, Ball]), (3, 0));
        assert_eq!(count_of(&[Strike, Strike, Strike]), (0, 2));
        assert_eq!(count_of(&[Ball, InPlay]), (1, 0));
    }
}
