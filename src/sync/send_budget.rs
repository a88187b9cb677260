/// Ceiling on outbound Telegram send attempts within one scheduled run,
/// shared across every feed processed in that run.
pub const MAX_SENDS_PER_RUN: u32 = 35;

/// Mutable per-run counter. Every attempt costs one unit, successful or
/// not; the counter is never replenished within a run.
#[derive(Debug)]
pub struct SendBudget {
    remaining: u32,
}

impl SendBudget {
    pub fn new(limit: u32) -> Self {
        SendBudget { remaining: limit }
    }

    pub fn per_run() -> Self {
        Self::new(MAX_SENDS_PER_RUN)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Whether the budget covers `attempts` more sends without going over.
    pub fn can_afford(&self, attempts: usize) -> bool {
        self.remaining as usize >= attempts
    }

    /// Takes one unit for a send attempt. Returns false, consuming
    /// nothing, once the budget is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }

        self.remaining -= 1;

        true
    }
}
