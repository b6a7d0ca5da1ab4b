use crate::TxScriptError;

/// State of one open IF/NOTIF block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Taken,
    NotTaken,
}

impl Branch {
    pub fn toggle(self) -> Self {
        match self {
            Branch::Taken => Branch::NotTaken,
            Branch::NotTaken => Branch::Taken,
        }
    }
}

impl From<bool> for Branch {
    fn from(taken: bool) -> Self {
        match taken {
            true => Branch::Taken,
            false => Branch::NotTaken,
        }
    }
}

/// Stack of open conditional blocks.
///
/// Keeps the index of the lowest not-taken frame so that [`Self::succeeded`]
/// does not need to scan the whole stack for every executed opcode.
#[derive(Clone, Debug, Default)]
pub struct ConditionStack {
    frames: Vec<Branch>,
    first_not_taken: Option<usize>,
}

impl ConditionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, taken: bool) {
        let branch = Branch::from(taken);
        if branch == Branch::NotTaken && self.first_not_taken.is_none() {
            self.first_not_taken = Some(self.frames.len());
        }
        self.frames.push(branch);
    }

    /// Flips the innermost frame (OP_ELSE)
    pub fn negate(&mut self) -> Result<(), TxScriptError> {
        let top = self.frames.len().checked_sub(1).ok_or(TxScriptError::ErrUnbalancedConditional)?;
        let toggled = self.frames[top].toggle();
        self.frames[top] = toggled;
        match (toggled, self.first_not_taken) {
            (Branch::NotTaken, None) => self.first_not_taken = Some(top),
            (Branch::Taken, Some(pos)) if pos == top => self.first_not_taken = None,
            _ => {}
        }
        Ok(())
    }

    /// Pops the innermost frame (OP_ENDIF)
    pub fn close(&mut self) -> Result<(), TxScriptError> {
        self.frames.pop().ok_or(TxScriptError::ErrUnbalancedConditional)?;
        if self.first_not_taken == Some(self.frames.len()) {
            self.first_not_taken = None;
        }
        Ok(())
    }

    pub fn closed(&self) -> bool {
        self.frames.is_empty()
    }

    /// True when every open frame is taken
    pub fn succeeded(&self) -> bool {
        self.first_not_taken.is_none()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
