// SPDX-License-Identifier: Apache-2.0

use crate::IO;

/// Where a signal lives relative to the module declaring a connection or
/// block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    Own,
    Child,
}

/// What a signal may do in a connection declared by the scope module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Drive,
    Load,
    Either,
}

impl Role {
    pub(crate) fn of(io: IO, scope: Scope) -> Role {
        match (scope, io) {
            (Scope::Own, IO::Input(_)) => Role::Drive,
            (Scope::Own, IO::Output(_) | IO::Internal(_)) => Role::Either,
            (Scope::Child, IO::Input(_)) => Role::Load,
            // child wires are rejected before roles are assigned
            (Scope::Child, IO::Output(_) | IO::Internal(_)) => Role::Drive,
        }
    }

    fn can_drive(self) -> bool {
        !matches!(self, Role::Load)
    }

    fn can_load(self) -> bool {
        !matches!(self, Role::Drive)
    }
}

/// Decides which side of a connection drives: `Ok(true)` if `a` drives `b`,
/// `Ok(false)` if `b` drives `a`. `a` wins when both orientations are legal.
pub(crate) fn orient(a: Role, b: Role) -> Result<bool, &'static str> {
    if a.can_drive() && b.can_load() {
        Ok(true)
    } else if b.can_drive() && a.can_load() {
        Ok(false)
    } else if a == Role::Drive {
        Err("both sides are drivers")
    } else {
        Err("neither side is a driver")
    }
}

/// Checks that a block in the scope module may write the signal.
pub(crate) fn check_block_write(io: IO, scope: Scope) -> Result<(), &'static str> {
    match (scope, io) {
        (Scope::Own, IO::Input(_)) => Err("a block cannot write an input of its own module"),
        (Scope::Child, IO::Output(_)) => Err("a block cannot write an output of a submodule"),
        _ => Ok(()),
    }
}
