//! AVM1 action model and offset addressed action streams.
//!
//! The byte level parser is a collaborator of this crate: decompilation consumes already
//! decoded [`Action`] records through the [`ActionReader`] trait, which answers "which action
//! starts at this offset, and where does the next one start". Branch actions carry signed
//! displacements relative to the end of the branch, so the reader must preserve the encoded
//! layout of the stream.
//!
//! [`ActionList`] is an in-memory reader that lays actions out using their AVM1 encoded sizes.
//! It is the reader used by tests and by callers that decode bytecode elsewhere.
//!
//! # Examples
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList, ActionReader, Value};
//!
//! let mut list = ActionList::new(vec![
//!     Action::Push { values: vec![Value::Boolean(true)] },
//!     Action::If { offset: 0 },
//!     Action::Trace,
//! ]);
//! // Branch over the trace, to the end of the stream
//! list.link_branch(1, 3)?;
//!
//! let (action, next) = list.read_at(0).unwrap();
//! assert_eq!(action.kind(), "Push");
//! assert_eq!(next, 5);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

use strum::{AsRefStr, IntoStaticStr};

use crate::Result;

/// A value pushed by [`Action::Push`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean literal
    Boolean(bool),
    /// Index into the active constant pool
    Constant(u16),
    /// Single precision float
    Float32(f32),
    /// Double precision float
    Float64(f64),
    /// `null`
    Null,
    /// Register reference
    Register(u8),
    /// Signed 32-bit integer
    Sint32(i32),
    /// String literal
    String(String),
    /// `undefined`
    Undefined,
}

impl Value {
    /// Returns the number of bytes this value occupies inside a `Push` payload.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::String(value) => 1 + value.len() + 1,
            Value::Boolean(_) | Value::Register(_) => 2,
            Value::Constant(id) => {
                if *id < 256 {
                    2
                } else {
                    3
                }
            }
            Value::Float32(_) | Value::Sint32(_) => 5,
            Value::Float64(_) => 9,
            Value::Null | Value::Undefined => 1,
        }
    }
}

/// A decoded AVM1 action.
///
/// Variants carry operands only, no interpretation. The variant name is available through
/// [`Action::kind`] and is what [`crate::Error::Unsupported`] reports.
#[derive(Debug, Clone, PartialEq, IntoStaticStr, AsRefStr)]
pub enum Action {
    /// Legacy (AS1) addition
    Add,
    /// ECMA-262 addition
    Add2,
    /// Bitwise and
    BitAnd,
    /// Left shift
    BitLShift,
    /// Bitwise or
    BitOr,
    /// Signed right shift
    BitRShift,
    /// Unsigned right shift
    BitURShift,
    /// Bitwise xor
    BitXor,
    /// Call the function named on the stack
    CallFunction,
    /// Call a method of the object on the stack
    CallMethod,
    /// Define the constant pool for subsequent `Push` actions
    ConstantPool {
        /// Pool entries, addressed by [`Value::Constant`]
        pool: Vec<String>,
    },
    /// Decrement the top of the stack
    Decrement,
    /// Declare a local variable without value
    DefineLocal,
    /// Declare a local variable with value
    DefineLocal2,
    /// Division
    Divide,
    /// Push the enumerable property names of an object
    Enumerate,
    /// ECMA-262 equality
    Equals2,
    /// Read a member of an object
    GetMember,
    /// Read a movie clip property by index
    GetProperty,
    /// Read a variable by name
    GetVariable,
    /// Greater than comparison
    Greater,
    /// Conditional branch, taken when the popped test is truthy
    If {
        /// Displacement relative to the end of this action
        offset: i16,
    },
    /// Increment the top of the stack
    Increment,
    /// Build an array from stack items
    InitArray,
    /// Build an object from stack items
    InitObject,
    /// `instanceof` check
    InstanceOf,
    /// Unconditional branch
    Jump {
        /// Displacement relative to the end of this action
        offset: i16,
    },
    /// Less than comparison
    Less2,
    /// Remainder
    Modulo,
    /// Multiplication
    Multiply,
    /// Logical negation
    Not,
    /// Start playing the timeline
    Play,
    /// Discard the top of the stack
    Pop,
    /// Push one or more values
    Push {
        /// Values in push order
        values: Vec<Value>,
    },
    /// Duplicate the top of the stack
    PushDuplicate,
    /// Return from the current function
    Return,
    /// Write a member of an object
    SetMember,
    /// Write a movie clip property by index
    SetProperty,
    /// Write a variable by name
    SetVariable,
    /// Swap the two topmost stack items
    StackSwap,
    /// Stop the timeline
    Stop,
    /// Copy the top of the stack into a register
    StoreRegister {
        /// Destination register
        register: u8,
    },
    /// Strict equality
    StrictEquals,
    /// Subtraction
    Subtract,
    /// Throw the top of the stack
    Throw,
    /// Numeric conversion
    ToNumber,
    /// String conversion
    ToString,
    /// Print the top of the stack
    Trace,
    /// `typeof` operator
    TypeOf,
    /// An action without a dedicated variant
    Unknown {
        /// Action code
        code: u8,
        /// Raw payload, empty for codes below `0x80`
        data: Vec<u8>,
    },
}

impl Action {
    /// Returns the variant tag of this action.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns the AVM1 action code.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Action::Add => 0x0a,
            Action::Add2 => 0x47,
            Action::BitAnd => 0x60,
            Action::BitLShift => 0x63,
            Action::BitOr => 0x61,
            Action::BitRShift => 0x64,
            Action::BitURShift => 0x65,
            Action::BitXor => 0x62,
            Action::CallFunction => 0x3d,
            Action::CallMethod => 0x52,
            Action::ConstantPool { .. } => 0x88,
            Action::Decrement => 0x51,
            Action::DefineLocal => 0x3c,
            Action::DefineLocal2 => 0x41,
            Action::Divide => 0x0d,
            Action::Enumerate => 0x46,
            Action::Equals2 => 0x49,
            Action::GetMember => 0x4e,
            Action::GetProperty => 0x22,
            Action::GetVariable => 0x1c,
            Action::Greater => 0x67,
            Action::If { .. } => 0x9d,
            Action::Increment => 0x50,
            Action::InitArray => 0x42,
            Action::InitObject => 0x43,
            Action::InstanceOf => 0x54,
            Action::Jump { .. } => 0x99,
            Action::Less2 => 0x48,
            Action::Modulo => 0x3f,
            Action::Multiply => 0x0c,
            Action::Not => 0x12,
            Action::Play => 0x06,
            Action::Pop => 0x17,
            Action::Push { .. } => 0x96,
            Action::PushDuplicate => 0x4c,
            Action::Return => 0x3e,
            Action::SetMember => 0x4f,
            Action::SetProperty => 0x23,
            Action::SetVariable => 0x1d,
            Action::StackSwap => 0x4d,
            Action::Stop => 0x07,
            Action::StoreRegister { .. } => 0x87,
            Action::StrictEquals => 0x66,
            Action::Subtract => 0x0b,
            Action::Throw => 0x2a,
            Action::ToNumber => 0x4a,
            Action::ToString => 0x4b,
            Action::Trace => 0x26,
            Action::TypeOf => 0x44,
            Action::Unknown { code, .. } => *code,
        }
    }

    /// Returns the number of bytes this action occupies in the encoded stream.
    ///
    /// Codes below `0x80` are a single byte. Longer actions carry a 3-byte header (code and
    /// payload length) followed by their payload.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        if self.code() < 0x80 {
            return 1;
        }
        let payload = match self {
            Action::ConstantPool { pool } => 2 + pool.iter().map(|s| s.len() + 1).sum::<usize>(),
            Action::If { .. } | Action::Jump { .. } => 2,
            Action::Push { values } => values.iter().map(Value::encoded_len).sum(),
            Action::StoreRegister { .. } => 1,
            Action::Unknown { data, .. } => data.len(),
            _ => 0,
        };
        3 + payload
    }

    /// Returns `true` for the binary operators that pop two operands and push one result.
    #[must_use]
    pub const fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            Action::Add
                | Action::Add2
                | Action::BitAnd
                | Action::BitLShift
                | Action::BitOr
                | Action::BitRShift
                | Action::BitURShift
                | Action::BitXor
                | Action::Divide
                | Action::Equals2
                | Action::Greater
                | Action::InstanceOf
                | Action::Less2
                | Action::Modulo
                | Action::Multiply
                | Action::StrictEquals
                | Action::Subtract
        )
    }
}

/// Random access to a decoded action stream.
///
/// Implementations report `None` for offsets that do not start an action: past the end of
/// the stream, inside another action, or unreadable. The CFG builder treats all of these as
/// the end of the current path.
pub trait ActionReader {
    /// Reads the action starting at `offset`.
    ///
    /// # Returns
    ///
    /// The action and the offset immediately after it, or `None` if no action starts there.
    fn read_at(&self, offset: usize) -> Option<(Action, usize)>;
}

impl<R: ActionReader + ?Sized> ActionReader for &R {
    fn read_at(&self, offset: usize) -> Option<(Action, usize)> {
        (**self).read_at(offset)
    }
}

/// An in-memory action stream with AVM1 encoded layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionList {
    actions: Vec<Action>,
    offsets: Vec<usize>,
    end: usize,
}

impl ActionList {
    /// Creates a stream from actions in program order.
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        let mut offsets = Vec::with_capacity(actions.len());
        let mut end = 0;
        for action in &actions {
            offsets.push(end);
            end += action.encoded_len();
        }
        Self {
            actions,
            offsets,
            end,
        }
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the stream holds no action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the actions in program order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the start offset of the action at `index`.
    ///
    /// `index == len()` yields the end offset of the stream.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        if index == self.actions.len() {
            Some(self.end)
        } else {
            self.offsets.get(index).copied()
        }
    }

    /// Points the branch at `index` to the action at `target`.
    ///
    /// `target == len()` branches to the end of the stream. Branch actions have a fixed size,
    /// so relinking never moves other actions.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if `index` is not an `If`/`Jump` action or if the
    /// displacement does not fit the 16-bit operand.
    pub fn link_branch(&mut self, index: usize, target: usize) -> Result<()> {
        let from = self
            .offset_of(index + 1)
            .ok_or_else(|| invariant_error!("Action index {} out of range", index))?;
        let to = self
            .offset_of(target)
            .ok_or_else(|| invariant_error!("Branch target {} out of range", target))?;
        let displacement = i64::try_from(to).unwrap_or(i64::MAX) - i64::try_from(from).unwrap_or(0);
        let displacement = i16::try_from(displacement)
            .map_err(|_| invariant_error!("Branch displacement {} overflows", displacement))?;

        match self.actions.get_mut(index) {
            Some(Action::If { offset } | Action::Jump { offset }) => {
                *offset = displacement;
                Ok(())
            }
            Some(other) => Err(invariant_error!(
                "Action {} at index {} is not a branch",
                other.kind(),
                index
            )),
            None => Err(invariant_error!("Action index {} out of range", index)),
        }
    }
}

impl FromIterator<Action> for ActionList {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ActionReader for ActionList {
    fn read_at(&self, offset: usize) -> Option<(Action, usize)> {
        let index = self.offsets.binary_search(&offset).ok()?;
        let action = self.actions.get(index)?;
        Some((action.clone(), offset + action.encoded_len()))
    }
}
