use crate::TxScriptError;

/// A data stack; the last element is the top
pub type Stack = Vec<Vec<u8>>;

/// Fixed-arity stack shuffles shared by the stack opcodes.
///
/// `SIZE` is the width of the group being moved, e.g. `dup_items::<2>` is
/// OP_2DUP. Every helper checks depth before touching the stack, so a failed
/// call leaves it unchanged.
pub(crate) trait DataStack {
    fn pop_raw<const SIZE: usize>(&mut self) -> Result<[Vec<u8>; SIZE], TxScriptError>;
    fn peek_raw<const SIZE: usize>(&self) -> Result<[&[u8]; SIZE], TxScriptError>;
    fn drop_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError>;
    fn dup_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError>;
    fn over_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError>;
    fn rot_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError>;
    fn swap_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError>;
}

impl DataStack for Stack {
    /// Returns the top `SIZE` items in stack order (top last)
    #[inline]
    fn pop_raw<const SIZE: usize>(&mut self) -> Result<[Vec<u8>; SIZE], TxScriptError> {
        let len = self.len();
        if len < SIZE {
            return Err(TxScriptError::InvalidStackOperation(SIZE, len));
        }
        self.split_off(len - SIZE).try_into().map_err(|_| TxScriptError::InvalidStackOperation(SIZE, len))
    }

    #[inline]
    fn peek_raw<const SIZE: usize>(&self) -> Result<[&[u8]; SIZE], TxScriptError> {
        let len = self.len();
        if len < SIZE {
            return Err(TxScriptError::InvalidStackOperation(SIZE, len));
        }
        let mut items = [&[][..]; SIZE];
        for (slot, item) in items.iter_mut().zip(self[len - SIZE..].iter()) {
            *slot = item.as_slice();
        }
        Ok(items)
    }

    #[inline]
    fn drop_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError> {
        match self.len() >= SIZE {
            true => {
                self.truncate(self.len() - SIZE);
                Ok(())
            }
            false => Err(TxScriptError::InvalidStackOperation(SIZE, self.len())),
        }
    }

    #[inline]
    fn dup_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError> {
        match self.len() >= SIZE {
            true => {
                self.extend_from_within(self.len() - SIZE..);
                Ok(())
            }
            false => Err(TxScriptError::InvalidStackOperation(SIZE, self.len())),
        }
    }

    #[inline]
    fn over_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError> {
        match self.len() >= 2 * SIZE {
            true => {
                self.extend_from_within(self.len() - 2 * SIZE..self.len() - SIZE);
                Ok(())
            }
            false => Err(TxScriptError::InvalidStackOperation(2 * SIZE, self.len())),
        }
    }

    #[inline]
    fn rot_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError> {
        match self.len() >= 3 * SIZE {
            true => {
                let drained = self.drain(self.len() - 3 * SIZE..self.len() - 2 * SIZE).collect::<Vec<Vec<u8>>>();
                self.extend(drained);
                Ok(())
            }
            false => Err(TxScriptError::InvalidStackOperation(3 * SIZE, self.len())),
        }
    }

    #[inline]
    fn swap_items<const SIZE: usize>(&mut self) -> Result<(), TxScriptError> {
        match self.len() >= 2 * SIZE {
            true => {
                let drained = self.drain(self.len() - 2 * SIZE..self.len() - SIZE).collect::<Vec<Vec<u8>>>();
                self.extend(drained);
                Ok(())
            }
            false => Err(TxScriptError::InvalidStackOperation(2 * SIZE, self.len())),
        }
    }
}
