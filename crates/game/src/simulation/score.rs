use crate::net::ScorePacket;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalScored {
    pub player1_increment: i32,
    pub player2_increment: i32,
}

impl GoalScored {
    pub fn player1() -> Self {
        Self {
            player1_increment: 1,
            player2_increment: 0,
        }
    }

    pub fn player2() -> Self {
        Self {
            player1_increment: 0,
            player2_increment: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub player1: i32,
    pub player2: i32,
}

impl ScoreBoard {
    pub fn apply(&mut self, goal: GoalScored) {
        self.player1 = self.player1.saturating_add(goal.player1_increment);
        self.player2 = self.player2.saturating_add(goal.player2_increment);
    }

    pub fn set_from_packet(&mut self, packet: &ScorePacket) -> bool {
        let next = Self {
            player1: packet.player1_score,
            player2: packet.player2_score,
        };
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn to_packet(&self) -> ScorePacket {
        ScorePacket {
            player1_score: self.player1,
            player2_score: self.player2,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
